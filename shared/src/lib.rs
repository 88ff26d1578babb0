//! Shared types and utilities for Pixelbench
//!
//! This crate contains the data model used on the host side of the benchmark:
//! the RGBA pixel buffer, filter requests, and benchmark results. The guest
//! filter module deliberately does not depend on it.

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::ValidationError;
pub use types::{benchmark::*, filter::*, pixel::*};
