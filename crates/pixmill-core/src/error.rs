//! Error types for pixmill-core operations.
//!
//! Bitmap construction and pixel access report failures through [`Error`].
//! Index lookups never fail: [`crate::Bitmap::pixel_index`] returns `None`
//! for coordinates outside the bitmap so scan loops can skip them.
//!
//! # Usage
//!
//! ```rust
//! use pixmill_core::{Bitmap, Error};
//!
//! let bitmap = Bitmap::new(4, 4);
//! let err = bitmap.get_pixel_color(10, 0).unwrap_err();
//! assert!(matches!(err, Error::OutOfBounds { x: 10, .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by bitmap construction and pixel access.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Pixel coordinates are outside the bitmap.
    ///
    /// Coordinates are signed so that negative lookups can be reported
    /// verbatim.
    #[error("pixel ({x}, {y}) out of bounds for bitmap {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: i64,
        /// Y coordinate that was out of bounds
        y: i64,
        /// Bitmap width
        width: u32,
        /// Bitmap height
        height: u32,
    },

    /// Raw buffer length does not match `width * height * 4`.
    #[error("buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    BufferSize {
        /// Bitmap width
        width: u32,
        /// Bitmap height
        height: u32,
        /// Required byte count
        expected: usize,
        /// Provided byte count
        actual: usize,
    },

    /// Two bitmaps that must share dimensions do not.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First bitmap width
        a_width: u32,
        /// First bitmap height
        a_height: u32,
        /// Second bitmap width
        b_width: u32,
        /// Second bitmap height
        b_height: u32,
    },

    /// Width or height is unusable (zero, or the byte size overflows).
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Why the dimensions were rejected
        reason: String,
    },

    /// A parameter is outside its accepted domain (e.g. a malformed hex color).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}
