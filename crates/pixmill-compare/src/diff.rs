//! Pixel-level image comparison.
//!
//! Pixels are compared with a perceptual YIQ color distance after blending
//! each color over white by its alpha. A pixel counts as different when the
//! distance exceeds `35215 * threshold^2`, the squared YIQ distance between
//! black and white scaled by the threshold.
//!
//! Differences that look like anti-aliasing (the pixel sits on a gradient
//! between a darkest and a brightest neighbor in either image) are painted
//! yellow and left out of the count unless [`DiffOptions::include_aa`] is
//! set.
//!
//! # Output image
//!
//! | pixel                     | color                         |
//! |---------------------------|-------------------------------|
//! | different                 | red `(255, 0, 0)`             |
//! | anti-aliased difference   | yellow `(255, 255, 0)`        |
//! | matching                  | first image's luma, faded 90% |
//!
//! The output is opaque.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_compare::diff::{diff, DiffOptions};
//!
//! let a = Bitmap::filled(10, 10, 0xFFFFFFFF);
//! let mut b = a.clone();
//! b.set_pixel_color(0x000000FF, 0, 0).unwrap();
//!
//! let result = diff(&a, &b, &DiffOptions::default()).unwrap();
//! assert_eq!(result.diff_pixels, 1);
//! assert_eq!(result.percent, 0.01);
//! assert_eq!(result.image.get_pixel_color(0, 0).unwrap(), 0xFF0000FF);
//! ```

use pixmill_core::{Bitmap, Error, Rgba, CHANNELS};
use pixmill_ops::resize::{resize_exact, ResizeMode};
use tracing::{debug, trace};

use crate::{CompareError, CompareResult};

/// Squared YIQ distance between black and white.
const MAX_YIQ_DELTA: f64 = 35215.0;

/// Painted where pixels differ.
pub const DIFF_COLOR: Rgba = Rgba::rgb(255, 0, 0);

/// Painted where a difference is classified as anti-aliasing.
pub const AA_COLOR: Rgba = Rgba::rgb(255, 255, 0);

/// Opacity of the faded first image behind matching pixels.
const MATCH_ALPHA: f64 = 0.1;

/// Comparison settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffOptions {
    /// Sensitivity in `[0, 1]`; smaller is stricter.
    pub threshold: f64,
    /// Count anti-aliased pixels as differences.
    pub include_aa: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_aa: false,
        }
    }
}

impl DiffOptions {
    /// Options with the given threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

/// Outcome of [`diff`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    /// Visualization of the differences, same size as the inputs.
    pub image: Bitmap,
    /// `diff_pixels / total pixels`, in `[0, 1]`.
    pub percent: f64,
    /// Number of pixels counted as different.
    pub diff_pixels: usize,
}

/// Compares two bitmaps of equal size pixel by pixel.
///
/// Fails with a dimension mismatch when sizes differ and with
/// `InvalidParameter` when the threshold is outside `[0, 1]`.
pub fn diff(a: &Bitmap, b: &Bitmap, options: &DiffOptions) -> CompareResult<DiffResult> {
    let threshold = options.threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CompareError::InvalidParameter(format!(
            "diff threshold {threshold} is outside [0, 1]"
        )));
    }
    if a.dimensions() != b.dimensions() {
        return Err(Error::dimension_mismatch(a.dimensions(), b.dimensions()).into());
    }

    let (w, h) = a.dimensions();
    let max_delta = MAX_YIQ_DELTA * threshold * threshold;
    let mut image = Bitmap::new(w, h);
    let mut diff_pixels = 0usize;
    let mut aa_pixels = 0usize;

    for y in 0..h {
        for x in 0..w {
            let pos = (y as usize * w as usize + x as usize) * CHANNELS;
            let pa = &a.data()[pos..pos + CHANNELS];
            let pb = &b.data()[pos..pos + CHANNELS];

            let color = if color_delta(pa, pb) > max_delta {
                let aa = !options.include_aa
                    && (antialiased(a, x, y, Some(b)) || antialiased(b, x, y, Some(a)));
                if aa {
                    aa_pixels += 1;
                    AA_COLOR
                } else {
                    diff_pixels += 1;
                    DIFF_COLOR
                }
            } else {
                let v = faded_luma(pa);
                Rgba::rgb(v, v, v)
            };
            image.data_mut()[pos..pos + CHANNELS].copy_from_slice(&color.to_array());
        }
    }

    let total = a.pixel_count();
    let percent = if total == 0 {
        0.0
    } else {
        diff_pixels as f64 / total as f64
    };
    debug!(width = w, height = h, threshold, diff_pixels, aa_pixels, percent, "diff");

    Ok(DiffResult {
        image,
        percent,
        diff_pixels,
    })
}

/// Like [`diff`], but first resizes the larger bitmap (by pixel count)
/// down to the other's dimensions.
pub fn diff_fitted(a: &Bitmap, b: &Bitmap, options: &DiffOptions) -> CompareResult<DiffResult> {
    if a.dimensions() == b.dimensions() {
        return diff(a, b, options);
    }
    trace!(a = ?a.dimensions(), b = ?b.dimensions(), "diff_fitted: resampling");
    if a.pixel_count() > b.pixel_count() {
        let a = resize_exact(a, b.width(), b.height(), ResizeMode::Bilinear)?;
        diff(&a, b, options)
    } else {
        let b = resize_exact(b, a.width(), a.height(), ResizeMode::Bilinear)?;
        diff(a, &b, options)
    }
}

/// Blends a channel over white by alpha `a` in `[0, 1]`.
#[inline]
fn blend(c: f64, a: f64) -> f64 {
    255.0 + (c - 255.0) * a
}

#[inline]
fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

#[inline]
fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

#[inline]
fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

/// A pixel's RGB blended over white.
#[inline]
fn over_white(px: &[u8]) -> [f64; 3] {
    let a = px[3] as f64 / 255.0;
    [
        blend(px[0] as f64, a),
        blend(px[1] as f64, a),
        blend(px[2] as f64, a),
    ]
}

/// Squared YIQ distance between two pixels.
fn color_delta(p1: &[u8], p2: &[u8]) -> f64 {
    if p1 == p2 {
        return 0.0;
    }
    let [r1, g1, b1] = over_white(p1);
    let [r2, g2, b2] = over_white(p2);

    let y = rgb2y(r1, g1, b1) - rgb2y(r2, g2, b2);
    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q
}

/// Signed brightness difference between two pixels.
fn brightness_delta(p1: &[u8], p2: &[u8]) -> f64 {
    if p1 == p2 {
        return 0.0;
    }
    let [r1, g1, b1] = over_white(p1);
    let [r2, g2, b2] = over_white(p2);
    rgb2y(r1, g1, b1) - rgb2y(r2, g2, b2)
}

/// Luma of `px` over white, faded toward white.
fn faded_luma(px: &[u8]) -> u8 {
    let [r, g, b] = over_white(px);
    let a = px[3] as f64 / 255.0;
    pixmill_core::limit255(blend(rgb2y(r, g, b), MATCH_ALPHA * a))
}

/// Reports whether pixel `(x, y)` of `img` looks anti-aliased.
///
/// A pixel qualifies when at most two of its neighbors share its exact
/// color and it has both darker and brighter neighbors. With `other`, the
/// darkest or the brightest neighbor must additionally sit in a flat area
/// of both images, i.e. not be anti-aliased itself.
fn antialiased(img: &Bitmap, x: u32, y: u32, other: Option<&Bitmap>) -> bool {
    let (w, h) = img.dimensions();
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let x2 = (x + 1).min(w - 1);
    let y2 = (y + 1).min(h - 1);
    let at = |px: u32, py: u32| {
        let pos = (py as usize * w as usize + px as usize) * CHANNELS;
        &img.data()[pos..pos + CHANNELS]
    };
    let center = at(x, y);

    let mut zeroes = 0;
    let mut positives = 0;
    let mut negatives = 0;
    let (mut min, mut max) = (0.0f64, 0.0f64);
    let (mut min_at, mut max_at) = ((0, 0), (0, 0));

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            let delta = brightness_delta(center, at(nx, ny));
            if delta == 0.0 {
                zeroes += 1;
            } else if delta < 0.0 {
                negatives += 1;
            } else {
                positives += 1;
            }

            if zeroes > 2 {
                return false;
            }
            if other.is_none() {
                continue;
            }
            if delta < min {
                min = delta;
                min_at = (nx, ny);
            }
            if delta > max {
                max = delta;
                max_at = (nx, ny);
            }
        }
    }

    let Some(other) = other else {
        return true;
    };
    if negatives == 0 || positives == 0 {
        return false;
    }

    let flat = |(px, py): (u32, u32)| !antialiased(img, px, py, None) && !antialiased(other, px, py, None);
    flat(min_at) || flat(max_at)
}
