//! Error types for raster operations.

use thiserror::Error;

/// Error type for raster operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    /// Invalid target dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Two bitmaps that must match in size do not.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A named color operation is not recognized.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Failure reported by the bitmap layer.
    #[error(transparent)]
    Core(#[from] pixmill_core::Error),
}

/// Result type for raster operations.
pub type OpsResult<T> = Result<T, OpsError>;
