//! Error types for hashing and diffing.

use pixmill_ops::OpsError;
use thiserror::Error;

/// Error type for comparison operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    /// Invalid parameter value (radix, threshold, hash text).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Failure from the bitmap layer, including dimension mismatches.
    #[error(transparent)]
    Core(#[from] pixmill_core::Error),

    /// Failure while resampling.
    #[error(transparent)]
    Ops(#[from] OpsError),
}

impl CompareError {
    /// Returns `true` if two inputs had different dimensions.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, Self::Core(pixmill_core::Error::DimensionMismatch { .. }))
    }
}

/// Result type for comparison operations.
pub type CompareResult<T> = Result<T, CompareError>;
