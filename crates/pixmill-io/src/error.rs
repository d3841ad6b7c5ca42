//! Error types for codec and byte-source operations.

use std::io;
use thiserror::Error;

/// Codec or I/O failure.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bytes could not be decoded into a bitmap.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Bitmap could not be encoded.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Unknown MIME type, extension, magic number or locator scheme.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for codec operations.
pub type IoResult<T> = Result<T, IoError>;
