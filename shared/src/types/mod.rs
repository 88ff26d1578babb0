//! Core data model

pub mod benchmark;
pub mod filter;
pub mod pixel;
