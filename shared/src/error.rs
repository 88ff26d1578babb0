//! Validation errors for pixel buffers and filter requests

use thiserror::Error;

/// Rejections raised before any filter runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pixel buffer dimensions must be non-zero (got {width}x{height})")]
    EmptyDimensions { width: u32, height: u32 },

    #[error(
        "pixel buffer length mismatch for {width}x{height}: expected {expected} bytes, got {actual}"
    )]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("pixel buffer {width}x{height} exceeds the 32-bit address space of the filter module")]
    TooLarge { width: u32, height: u32 },

    #[error("brightness delta {0} is outside [-255, 255]")]
    BrightnessOutOfRange(i32),

    #[error("unknown filter kind: {0}")]
    UnknownFilter(String),
}
