//! Parameter validation guards for raster operations.
//!
//! Every fallible operation validates its arguments through these helpers
//! before touching pixel data, so a rejected call leaves the bitmap
//! untouched.
//!
//! # Example
//!
//! ```rust
//! use pixmill_ops::guard::{ensure_unit, ensure_signed_unit};
//!
//! assert!(ensure_unit("opacity", 0.5).is_ok());
//! assert!(ensure_unit("opacity", 1.5).is_err());
//! assert!(ensure_signed_unit("brightness", -1.0).is_ok());
//! ```

use pixmill_core::CHANNELS;

use crate::{OpsError, OpsResult};

/// Validates that `value` is finite and in `[0, 1]`.
pub fn ensure_unit(op: &str, value: f64) -> OpsResult<()> {
    ensure_range(op, value, 0.0, 1.0)
}

/// Validates that `value` is finite and in `[-1, 1]`.
pub fn ensure_signed_unit(op: &str, value: f64) -> OpsResult<()> {
    ensure_range(op, value, -1.0, 1.0)
}

/// Validates that `value` is finite and in `[min, max]`.
pub fn ensure_range(op: &str, value: f64, min: f64, max: f64) -> OpsResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(OpsError::InvalidParameter(format!(
            "{op}: {value} is outside [{min}, {max}]"
        )));
    }
    Ok(())
}

/// Validates that `value` is finite and at least `min`.
pub fn ensure_at_least(op: &str, value: f64, min: f64) -> OpsResult<()> {
    if !value.is_finite() || value < min {
        return Err(OpsError::InvalidParameter(format!(
            "{op}: {value} must be >= {min}"
        )));
    }
    Ok(())
}

/// Validates that both target dimensions are non-zero and that an RGBA
/// buffer of that size is addressable.
pub fn ensure_dimensions(op: &str, width: u32, height: u32) -> OpsResult<()> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "{op}: target size {width}x{height} must be > 0"
        )));
    }
    let bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS));
    if bytes.is_none() {
        return Err(OpsError::InvalidDimensions(format!(
            "{op}: target size {width}x{height} overflows the address space"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(ensure_unit("fade", 0.0).is_ok());
        assert!(ensure_unit("fade", 1.0).is_ok());
        assert!(ensure_unit("fade", -0.01).is_err());
        assert!(ensure_unit("fade", f64::NAN).is_err());
        assert!(ensure_signed_unit("contrast", 1.01).is_err());
        assert!(ensure_at_least("gaussian", 1.0, 1.0).is_ok());
        assert!(ensure_at_least("gaussian", f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_dimensions() {
        assert!(ensure_dimensions("resize", 1, 1).is_ok());
        let err = ensure_dimensions("resize", 0, 5).unwrap_err();
        assert!(matches!(err, OpsError::InvalidDimensions(_)));
        assert!(err.to_string().contains("0x5"));

        let huge = ensure_dimensions("crop", u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(huge, OpsError::InvalidDimensions(_)));
    }
}
