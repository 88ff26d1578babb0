//! Bridge error taxonomy

use pixelbench_shared::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The module failed to compile, link or instantiate
    #[error("filter module unavailable: {0:#}")]
    ModuleUnavailable(#[source] anyhow::Error),

    /// `alloc` returned the null sentinel
    #[error("filter module could not allocate {size} bytes")]
    AllocationFailed { size: u32 },

    /// Bridge bookkeeping disagrees with the live region
    #[error("bridge size mismatch: region holds {expected} bytes, caller passed {actual}")]
    SizeMismatch { expected: u32, actual: usize },

    /// The pixel buffer or its dimensions were rejected
    #[error(transparent)]
    InvalidBuffer(ValidationError),

    /// The filter kind or its parameters were rejected
    #[error(transparent)]
    InvalidRequest(ValidationError),

    /// An export trapped or could not be called
    #[error("`{export}` failed: {source:#}")]
    Invoke {
        export: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A copy fell outside the module's linear memory
    #[error("out-of-bounds access to module memory at {address:#x} (+{len} bytes)")]
    MemoryAccess { address: u32, len: usize },
}

impl From<ValidationError> for BridgeError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::BrightnessOutOfRange(_) | ValidationError::UnknownFilter(_) => {
                BridgeError::InvalidRequest(err)
            }
            ValidationError::EmptyDimensions { .. }
            | ValidationError::LengthMismatch { .. }
            | ValidationError::TooLarge { .. } => BridgeError::InvalidBuffer(err),
        }
    }
}

impl BridgeError {
    /// Whether the caller may report the failure and try again on the next
    /// request. Bookkeeping and validation failures are defects and are not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BridgeError::ModuleUnavailable(_)
                | BridgeError::AllocationFailed { .. }
                | BridgeError::Invoke { .. }
        )
    }
}
