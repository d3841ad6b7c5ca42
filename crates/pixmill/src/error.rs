//! Unified error type for [`crate::Image`] operations.

use thiserror::Error;

/// Any failure an [`crate::Image`] call can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel access or construction failure.
    #[error(transparent)]
    Core(#[from] pixmill_core::Error),

    /// Raster operation failure.
    #[error(transparent)]
    Ops(#[from] pixmill_ops::OpsError),

    /// Hashing or diffing failure.
    #[error(transparent)]
    Compare(#[from] pixmill_compare::CompareError),

    /// Codec or I/O failure.
    #[error(transparent)]
    Io(#[from] pixmill_io::IoError),
}

impl Error {
    /// True for invalid arguments, whichever layer rejected them.
    pub fn is_invalid_parameter(&self) -> bool {
        use pixmill_compare::CompareError;
        use pixmill_ops::OpsError;
        match self {
            Error::Core(pixmill_core::Error::InvalidParameter(_)) => true,
            Error::Ops(OpsError::InvalidParameter(_) | OpsError::UnknownOperation(_)) => true,
            Error::Ops(OpsError::Core(pixmill_core::Error::InvalidParameter(_))) => true,
            Error::Compare(CompareError::InvalidParameter(_)) => true,
            _ => false,
        }
    }
}

/// Result type for [`crate::Image`] operations.
pub type Result<T> = std::result::Result<T, Error>;
