//! Per-pixel color and alpha adjustments.
//!
//! Every function here is a point operation: each output pixel depends only
//! on the same input pixel, so rows are processed in parallel when the
//! `parallel` feature is on. Parameters are validated before any pixel is
//! touched, and results are clamped to `[0, 255]` rather than failing.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_ops::adjust::{greyscale, invert};
//!
//! let mut bitmap = Bitmap::filled(4, 4, 0xFF0000FF);
//! greyscale(&mut bitmap);
//! assert_eq!(bitmap.get_pixel_color(0, 0).unwrap(), 0x363636FF);
//!
//! invert(&mut bitmap);
//! assert_eq!(bitmap.get_pixel_color(0, 0).unwrap(), 0xC9C9C9FF);
//! ```

use pixmill_core::color::luminance_rec709;
use pixmill_core::{limit255, Bitmap};
use tracing::debug;

use crate::guard::{ensure_signed_unit, ensure_unit};
use crate::{OpsError, OpsResult};

/// Sepia tone matrix applied to linear RGB rows.
pub const SEPIA_MATRIX: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Mid-gray pivot for contrast.
const MID_GRAY: f64 = 127.5;

/// Applies `f` to the RGB channels of every pixel, leaving alpha alone.
fn map_rgb<F>(bitmap: &mut Bitmap, f: F)
where
    F: Fn(u8) -> u8 + Send + Sync,
{
    bitmap.for_each_pixel_mut(|_, _, px| {
        for c in &mut px[..3] {
            *c = f(*c);
        }
    });
}

/// Shifts every channel toward white (`value > 0`) or black (`value < 0`).
///
/// `value` must lie in `[-1, 1]`.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::adjust::brightness;
///
/// let mut bitmap = Bitmap::filled(1, 1, 0x804020FF);
/// brightness(&mut bitmap, -0.5).unwrap();
/// assert_eq!(bitmap.get_pixel_color(0, 0).unwrap(), 0x402010FF);
/// ```
pub fn brightness(bitmap: &mut Bitmap, value: f64) -> OpsResult<()> {
    ensure_signed_unit("brightness", value)?;
    debug!(value, "brightness");
    map_rgb(bitmap, |c| {
        let c = c as f64;
        if value < 0.0 {
            limit255(c * (1.0 + value))
        } else {
            limit255(c + (255.0 - c) * value)
        }
    });
    Ok(())
}

/// Scales each channel's distance from mid-gray.
///
/// `value` in `[-1, 1]` maps to the factor `(1 + value) / (1 - value)`:
/// -1 flattens to gray, 0 is a no-op, 1 thresholds at mid-gray.
pub fn contrast(bitmap: &mut Bitmap, value: f64) -> OpsResult<()> {
    ensure_signed_unit("contrast", value)?;
    debug!(value, "contrast");

    if value >= 1.0 {
        map_rgb(bitmap, |c| if (c as f64) < MID_GRAY { 0 } else { 255 });
        return Ok(());
    }

    let factor = (1.0 + value) / (1.0 - value);
    map_rgb(bitmap, |c| limit255((c as f64 - MID_GRAY) * factor + MID_GRAY));
    Ok(())
}

/// Reduces each RGB channel to `levels` evenly spaced values.
///
/// Fails with `InvalidParameter` when `levels < 2`.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::adjust::posterize;
///
/// let mut bitmap = Bitmap::filled(1, 1, 0x7F80FFFF);
/// posterize(&mut bitmap, 2).unwrap();
/// assert_eq!(bitmap.get_pixel_color(0, 0).unwrap(), 0x0000FFFF);
/// assert!(posterize(&mut bitmap, 1).is_err());
/// ```
pub fn posterize(bitmap: &mut Bitmap, levels: u32) -> OpsResult<()> {
    if levels < 2 {
        return Err(OpsError::InvalidParameter(format!(
            "posterize: {levels} levels, need at least 2"
        )));
    }
    debug!(levels, "posterize");

    let steps = (levels - 1) as f64;
    map_rgb(bitmap, |c| {
        limit255((c as f64 / 255.0 * steps).floor() / steps * 255.0)
    });
    Ok(())
}

/// Replaces RGB with `255 - channel`.
pub fn invert(bitmap: &mut Bitmap) {
    debug!("invert");
    map_rgb(bitmap, |c| 255 - c);
}

/// Sets R, G and B of one pixel to its BT.709 luma.
#[inline]
pub(crate) fn greyscale_pixel(px: &mut [u8]) {
    let y = limit255(luminance_rec709(px[0], px[1], px[2]));
    px[..3].fill(y);
}

/// Replaces RGB with BT.709 luma `0.2126 R + 0.7152 G + 0.0722 B`.
pub fn greyscale(bitmap: &mut Bitmap) {
    debug!("greyscale");
    bitmap.for_each_pixel_mut(|_, _, px| greyscale_pixel(px));
}

/// Applies the [`SEPIA_MATRIX`] tone.
pub fn sepia(bitmap: &mut Bitmap) {
    debug!("sepia");
    bitmap.for_each_pixel_mut(|_, _, px| {
        let rgb = [px[0] as f64, px[1] as f64, px[2] as f64];
        for (c, row) in px[..3].iter_mut().zip(SEPIA_MATRIX) {
            *c = limit255(row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]);
        }
    });
}

/// Multiplies alpha by `factor` in `[0, 1]`.
pub fn opacity(bitmap: &mut Bitmap, factor: f64) -> OpsResult<()> {
    ensure_unit("opacity", factor)?;
    debug!(factor, "opacity");
    bitmap.for_each_pixel_mut(|_, _, px| px[3] = limit255(px[3] as f64 * factor));
    Ok(())
}

/// Fades the bitmap by `amount` in `[0, 1]`; same as `opacity(1 - amount)`.
pub fn fade(bitmap: &mut Bitmap, amount: f64) -> OpsResult<()> {
    ensure_unit("fade", amount)?;
    opacity(bitmap, 1.0 - amount)
}

/// Sets every alpha to 255.
pub fn opaque(bitmap: &mut Bitmap) {
    debug!("opaque");
    bitmap.for_each_pixel_mut(|_, _, px| px[3] = 255);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bitmap {
        let mut bitmap = Bitmap::new(6, 4);
        bitmap.for_each_pixel_mut(|x, y, px| {
            px.copy_from_slice(&[x as u8 * 40, y as u8 * 60, 200, 100 + x as u8]);
        });
        bitmap
    }

    #[test]
    fn test_invert_twice() {
        let src = sample();
        let mut img = src.clone();
        invert(&mut img);
        assert_eq!(img.pixel(1, 1).unwrap().r, 255 - 40);
        assert_eq!(img.pixel(1, 1).unwrap().a, 101);
        invert(&mut img);
        assert_eq!(img, src);
    }

    #[test]
    fn test_greyscale_red() {
        let mut bitmap = Bitmap::filled(4, 4, 0xFF0000FF);
        greyscale(&mut bitmap);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(bitmap.get_pixel_color(x, y).unwrap(), 0x363636FF);
            }
        }
    }

    #[test]
    fn test_brightness_bounds() {
        let mut bitmap = Bitmap::filled(1, 1, 0x804020FF);
        brightness(&mut bitmap, 1.0).unwrap();
        assert_eq!(bitmap.get_pixel_color(0, 0).unwrap(), 0xFFFFFFFF);
        brightness(&mut bitmap, -1.0).unwrap();
        assert_eq!(bitmap.get_pixel_color(0, 0).unwrap(), 0x000000FF);
        assert!(brightness(&mut bitmap, 1.5).is_err());
    }

    #[test]
    fn test_contrast() {
        let src = sample();
        let mut same = src.clone();
        contrast(&mut same, 0.0).unwrap();
        assert_eq!(same, src);

        let mut flat = src.clone();
        contrast(&mut flat, -1.0).unwrap();
        // factor 0: everything lands on 127.5, rounded up
        assert_eq!(flat.pixel(3, 2).unwrap().r, 128);

        let mut hard = src.clone();
        contrast(&mut hard, 1.0).unwrap();
        assert_eq!(hard.pixel(3, 0).unwrap().r, 0);
        assert_eq!(hard.pixel(4, 0).unwrap().r, 255);
        assert!(contrast(&mut hard, -1.1).is_err());
    }

    #[test]
    fn test_posterize_levels() {
        let mut bitmap = sample();
        posterize(&mut bitmap, 3).unwrap();
        bitmap.scan(0, 0, 6, 4, |x, y, _| {
            let px = bitmap.pixel(x as i64, y as i64).unwrap();
            for c in [px.r, px.g, px.b] {
                assert!(c == 0 || c == 128 || c == 255, "unexpected level {c}");
            }
        });
    }

    #[test]
    fn test_sepia_white() {
        let mut bitmap = Bitmap::filled(1, 1, 0xFFFFFF80);
        sepia(&mut bitmap);
        let px = bitmap.pixel(0, 0).unwrap();
        assert_eq!((px.r, px.g, px.b, px.a), (255, 255, 239, 0x80));
    }

    #[test]
    fn test_alpha_ops() {
        let mut bitmap = Bitmap::filled(2, 2, 0x102030C8);
        opacity(&mut bitmap, 0.5).unwrap();
        assert_eq!(bitmap.pixel(0, 0).unwrap().a, 100);
        fade(&mut bitmap, 0.5).unwrap();
        assert_eq!(bitmap.pixel(0, 0).unwrap().a, 50);
        assert!(opacity(&mut bitmap, -0.1).is_err());
        assert!(fade(&mut bitmap, 2.0).is_err());
        opaque(&mut bitmap);
        assert_eq!(bitmap.get_pixel_color(1, 1).unwrap(), 0x102030FF);
    }
}
