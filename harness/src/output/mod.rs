//! Report output formats

pub mod json;

pub use json::write_report;
