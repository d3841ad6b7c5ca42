//! Bitmap resize and resampling operations.
//!
//! Resizing is a two-pass separable convolution: each row is resampled
//! horizontally into a floating point buffer, then each column vertically.
//! All four channels, alpha included, are filtered independently without
//! premultiplication.
//!
//! # Modes
//!
//! - [`ResizeMode::NearestNeighbor`] - box kernel, no interpolation (blocky)
//! - [`ResizeMode::Bilinear`] - triangle kernel (default)
//! - [`ResizeMode::Bicubic`] - Catmull-Rom cubic, sharper than bilinear
//! - [`ResizeMode::Hermite`] - smooth cubic with no overshoot
//! - [`ResizeMode::Bezier`] - cubic B-spline, softest of the cubics
//!
//! When downscaling, the kernel support widens by the scale factor so every
//! source pixel contributes.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_ops::resize::{resize, ResizeMode, AUTO};
//!
//! let src = Bitmap::new(200, 400);
//! let dst = resize(&src, AUTO, 100.into(), ResizeMode::Bilinear).unwrap();
//! assert_eq!(dst.dimensions(), (50, 100));
//! ```

use std::fmt;
use std::str::FromStr;

use pixmill_core::{limit255, Bitmap, CHANNELS};
use tracing::{debug, trace};

use crate::guard::ensure_dimensions;
use crate::parallel::for_each_row;
use crate::{composite, transform, OpsError, OpsResult};

/// Resampling kernel for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ResizeMode {
    /// Nearest-neighbor (box kernel, no interpolation).
    NearestNeighbor,
    /// Bilinear interpolation (triangle kernel).
    #[default]
    Bilinear,
    /// Catmull-Rom bicubic interpolation.
    Bicubic,
    /// Hermite cubic interpolation.
    Hermite,
    /// Cubic B-spline (Bezier basis) smoothing.
    Bezier,
}

impl ResizeMode {
    /// All modes, in declaration order.
    pub const ALL: [ResizeMode; 5] = [
        ResizeMode::NearestNeighbor,
        ResizeMode::Bilinear,
        ResizeMode::Bicubic,
        ResizeMode::Hermite,
        ResizeMode::Bezier,
    ];

    /// Returns the support radius for this kernel.
    #[inline]
    pub fn support(&self) -> f64 {
        match self {
            ResizeMode::NearestNeighbor => 0.5,
            ResizeMode::Bilinear | ResizeMode::Hermite => 1.0,
            ResizeMode::Bicubic | ResizeMode::Bezier => 2.0,
        }
    }

    /// Evaluates the kernel at distance `x` from the sample center.
    #[inline]
    pub fn weight(&self, x: f64) -> f64 {
        match self {
            ResizeMode::NearestNeighbor => box_weight(x),
            ResizeMode::Bilinear => triangle_weight(x),
            ResizeMode::Bicubic => catmull_rom_weight(x),
            ResizeMode::Hermite => hermite_weight(x),
            ResizeMode::Bezier => bspline_weight(x),
        }
    }

    /// The string token for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::NearestNeighbor => "nearest-neighbor",
            ResizeMode::Bilinear => "bilinear",
            ResizeMode::Bicubic => "bicubic",
            ResizeMode::Hermite => "hermite",
            ResizeMode::Bezier => "bezier",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMode {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OpsError::InvalidParameter(format!("unknown resize mode '{s}'")))
    }
}

/// Half-open box: exactly one of two equidistant samples wins.
#[inline]
fn box_weight(x: f64) -> f64 {
    if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
}

#[inline]
fn triangle_weight(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Keys cubic with a = -0.5 (Catmull-Rom).
#[inline]
fn catmull_rom_weight(x: f64) -> f64 {
    const A: f64 = -0.5;
    let ax = x.abs();
    if ax < 1.0 {
        ((A + 2.0) * ax - (A + 3.0)) * ax * ax + 1.0
    } else if ax < 2.0 {
        ((A * ax - 5.0 * A) * ax + 8.0 * A) * ax - 4.0 * A
    } else {
        0.0
    }
}

#[inline]
fn hermite_weight(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 {
        (2.0 * ax - 3.0) * ax * ax + 1.0
    } else {
        0.0
    }
}

/// Uniform cubic B-spline, the Bezier basis on evenly spaced control points.
#[inline]
fn bspline_weight(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 {
        (4.0 - 6.0 * ax * ax + 3.0 * ax * ax * ax) / 6.0
    } else if ax < 2.0 {
        let t = 2.0 - ax;
        t * t * t / 6.0
    } else {
        0.0
    }
}

/// A target dimension: explicit pixels, or derived from the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Computed from the other dimension, preserving aspect ratio.
    Auto,
    /// Exact size in pixels.
    Px(u32),
}

/// Shorthand for [`Dim::Auto`].
pub const AUTO: Dim = Dim::Auto;

impl From<u32> for Dim {
    fn from(px: u32) -> Self {
        Dim::Px(px)
    }
}

/// Resolves a `(width, height)` request against a source size.
///
/// At most one side may be [`Dim::Auto`]; it becomes
/// `round(other_src * explicit / src)`, never less than 1.
///
/// # Example
///
/// ```rust
/// use pixmill_ops::resize::{target_dimensions, AUTO};
///
/// assert_eq!(target_dimensions(200, 400, AUTO, 100.into()).unwrap(), (50, 100));
/// assert_eq!(target_dimensions(300, 100, 150.into(), AUTO).unwrap(), (150, 50));
/// assert!(target_dimensions(10, 10, AUTO, AUTO).is_err());
/// ```
pub fn target_dimensions(src_w: u32, src_h: u32, width: Dim, height: Dim) -> OpsResult<(u32, u32)> {
    let derive = |explicit: u32, along: u32, across: u32| -> u32 {
        ((across as f64 * explicit as f64 / along as f64).round() as u32).max(1)
    };
    let (w, h) = match (width, height) {
        (Dim::Auto, Dim::Auto) => {
            return Err(OpsError::InvalidParameter(
                "width and height cannot both be AUTO".into(),
            ));
        }
        (Dim::Px(w), Dim::Px(h)) => (w, h),
        (Dim::Auto, Dim::Px(h)) => {
            ensure_source("resize", src_w, src_h)?;
            (derive(h, src_h, src_w), h)
        }
        (Dim::Px(w), Dim::Auto) => {
            ensure_source("resize", src_w, src_h)?;
            (w, derive(w, src_w, src_h))
        }
    };
    ensure_dimensions("resize", w, h)?;
    Ok((w, h))
}

fn ensure_source(op: &str, width: u32, height: u32) -> OpsResult<()> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "{op}: source bitmap {width}x{height} is empty"
        )));
    }
    Ok(())
}

/// Resizes a bitmap; either dimension may be [`AUTO`].
pub fn resize(src: &Bitmap, width: Dim, height: Dim, mode: ResizeMode) -> OpsResult<Bitmap> {
    let (w, h) = target_dimensions(src.width(), src.height(), width, height)?;
    resize_exact(src, w, h, mode)
}

/// Resizes a bitmap to exactly `width` x `height`.
///
/// Resizing to the current size returns an identical copy.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::resize::{resize_exact, ResizeMode};
///
/// let src = Bitmap::filled(16, 16, 0x804020FF);
/// let dst = resize_exact(&src, 32, 8, ResizeMode::Bicubic).unwrap();
/// assert_eq!(dst.dimensions(), (32, 8));
/// // A constant image stays constant
/// assert_eq!(dst.get_pixel_color(5, 5).unwrap(), 0x804020FF);
/// ```
pub fn resize_exact(src: &Bitmap, width: u32, height: u32, mode: ResizeMode) -> OpsResult<Bitmap> {
    ensure_dimensions("resize", width, height)?;
    ensure_source("resize", src.width(), src.height())?;
    debug!(
        src_w = src.width(),
        src_h = src.height(),
        dst_w = width,
        dst_h = height,
        mode = mode.as_str(),
        "resize"
    );

    if src.dimensions() == (width, height) {
        return Ok(src.clone());
    }

    let src_w = src.width() as usize;
    let src_h = src.height() as usize;
    let dst_w = width as usize;
    let dst_h = height as usize;

    let temp = resample_rows(src.data(), src_w, src_h, dst_w, mode);
    let out = resample_columns(&temp, dst_w, src_h, dst_h, mode);

    let data = out.into_iter().map(|v| limit255(v as f64)).collect();
    Ok(Bitmap::from_raw(width, height, data)?)
}

/// Source window and normalized weights for one output coordinate.
struct Contribution {
    start: usize,
    weights: Vec<f32>,
}

fn contributions(src_len: usize, dst_len: usize, mode: ResizeMode) -> Vec<Contribution> {
    let scale = src_len as f64 / dst_len as f64;
    let filter_scale = scale.max(1.0);
    let support = mode.support() * filter_scale;
    let last = src_len as isize - 1;

    (0..dst_len)
        .map(|i| {
            let center = (i as f64 + 0.5) * scale - 0.5;
            let start = ((center - support).floor() as isize).clamp(0, last) as usize;
            let end = ((center + support).ceil() as isize).clamp(0, last) as usize;

            let raw: Vec<f64> = (start..=end)
                .map(|s| mode.weight((s as f64 - center) / filter_scale))
                .collect();
            let sum: f64 = raw.iter().sum();

            if sum.abs() < 1e-12 {
                // Degenerate window: fall back to the closest sample.
                let nearest = (center.round() as isize).clamp(0, last) as usize;
                return Contribution {
                    start: nearest,
                    weights: vec![1.0],
                };
            }
            Contribution {
                start,
                weights: raw.iter().map(|w| (w / sum) as f32).collect(),
            }
        })
        .collect()
}

/// Horizontal pass: `src_w x rows` u8 -> `dst_w x rows` f32.
fn resample_rows(src: &[u8], src_w: usize, rows: usize, dst_w: usize, mode: ResizeMode) -> Vec<f32> {
    trace!(src_w, rows, dst_w, "resample_rows");
    let contribs = contributions(src_w, dst_w, mode);
    let mut dst = vec![0.0f32; dst_w * rows * CHANNELS];

    for_each_row(&mut dst, dst_w * CHANNELS, |y, row| {
        let src_row = &src[y * src_w * CHANNELS..(y + 1) * src_w * CHANNELS];
        for (x, contrib) in contribs.iter().enumerate() {
            let mut sum = [0.0f32; CHANNELS];
            for (k, w) in contrib.weights.iter().enumerate() {
                let idx = (contrib.start + k) * CHANNELS;
                for c in 0..CHANNELS {
                    sum[c] += src_row[idx + c] as f32 * w;
                }
            }
            row[x * CHANNELS..(x + 1) * CHANNELS].copy_from_slice(&sum);
        }
    });

    dst
}

/// Vertical pass: `cols x src_h` f32 -> `cols x dst_h` f32.
fn resample_columns(src: &[f32], cols: usize, src_h: usize, dst_h: usize, mode: ResizeMode) -> Vec<f32> {
    trace!(cols, src_h, dst_h, "resample_columns");
    let contribs = contributions(src_h, dst_h, mode);
    let row_len = cols * CHANNELS;
    let mut dst = vec![0.0f32; row_len * dst_h];

    for_each_row(&mut dst, row_len, |y, row| {
        let contrib = &contribs[y];
        for (k, w) in contrib.weights.iter().enumerate() {
            let src_row = &src[(contrib.start + k) * row_len..(contrib.start + k + 1) * row_len];
            for (d, s) in row.iter_mut().zip(src_row) {
                *d += s * w;
            }
        }
    });

    dst
}

/// Scales both dimensions by `factor`: `resize(round(w*f), round(h*f))`.
pub fn scale(src: &Bitmap, factor: f64, mode: ResizeMode) -> OpsResult<Bitmap> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(OpsError::InvalidParameter(format!(
            "scale: factor {factor} must be a positive number"
        )));
    }
    let w = (src.width() as f64 * factor).round() as u32;
    let h = (src.height() as f64 * factor).round() as u32;
    resize_exact(src, w, h, mode)
}

/// Largest scale factor such that the result fits inside `max_w` x `max_h`.
///
/// # Example
///
/// ```rust
/// use pixmill_ops::resize::fit_factor;
///
/// // 1920x1080 into a 640x480 box is limited by the width
/// assert_eq!(fit_factor(1920, 1080, 640, 480), 1.0 / 3.0);
/// ```
pub fn fit_factor(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> f64 {
    let target_ratio = max_w as f64 / max_h as f64;
    let src_ratio = src_w as f64 / src_h as f64;
    if target_ratio > src_ratio {
        max_h as f64 / src_h as f64
    } else {
        max_w as f64 / src_w as f64
    }
}

/// Smallest scale factor such that the result covers `min_w` x `min_h`.
pub fn fill_factor(src_w: u32, src_h: u32, min_w: u32, min_h: u32) -> f64 {
    let target_ratio = min_w as f64 / min_h as f64;
    let src_ratio = src_w as f64 / src_h as f64;
    if target_ratio > src_ratio {
        min_w as f64 / src_w as f64
    } else {
        min_h as f64 / src_h as f64
    }
}

/// Applies `factor` to a size, rounding and keeping each side >= 1.
pub fn scaled_dimensions(src_w: u32, src_h: u32, factor: f64) -> (u32, u32) {
    let w = ((src_w as f64 * factor).round() as u32).max(1);
    let h = ((src_h as f64 * factor).round() as u32).max(1);
    (w, h)
}

/// Scales preserving aspect ratio so the result fits inside `width` x `height`.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::resize::{scale_to_fit, ResizeMode};
///
/// let src = Bitmap::new(1920, 1080);
/// let dst = scale_to_fit(&src, 640, 640, ResizeMode::NearestNeighbor).unwrap();
/// assert_eq!(dst.dimensions(), (640, 360));
/// ```
pub fn scale_to_fit(src: &Bitmap, width: u32, height: u32, mode: ResizeMode) -> OpsResult<Bitmap> {
    ensure_dimensions("scale_to_fit", width, height)?;
    ensure_source("scale_to_fit", src.width(), src.height())?;
    let factor = fit_factor(src.width(), src.height(), width, height);
    let (w, h) = scaled_dimensions(src.width(), src.height(), factor);
    resize_exact(src, w.min(width), h.min(height), mode)
}

/// Scales so the result covers `width` x `height`, then crops the center.
///
/// The output is exactly `width` x `height`.
pub fn cover(src: &Bitmap, width: u32, height: u32, mode: ResizeMode) -> OpsResult<Bitmap> {
    ensure_dimensions("cover", width, height)?;
    ensure_source("cover", src.width(), src.height())?;
    let factor = fill_factor(src.width(), src.height(), width, height);
    let (w, h) = scaled_dimensions(src.width(), src.height(), factor);
    let scaled = resize_exact(src, w.max(width), h.max(height), mode)?;

    let x = center_offset(scaled.width(), width);
    let y = center_offset(scaled.height(), height);
    transform::crop(&scaled, x, y, width, height, 0)
}

/// Scales to fit inside `width` x `height`, centering the result on a
/// canvas of exactly that size filled with `background`.
pub fn contain(
    src: &Bitmap,
    width: u32,
    height: u32,
    mode: ResizeMode,
    background: u32,
) -> OpsResult<Bitmap> {
    ensure_dimensions("contain", width, height)?;
    let scaled = scale_to_fit(src, width, height, mode)?;

    let mut canvas = Bitmap::try_filled(width, height, background)?;
    let x = center_offset(width, scaled.width());
    let y = center_offset(height, scaled.height());
    composite::blit(&mut canvas, &scaled, x, y, None);
    Ok(canvas)
}

/// Offset that centers `inner` inside `outer`, rounding half up.
fn center_offset(outer: u32, inner: u32) -> i64 {
    ((outer as f64 - inner as f64) / 2.0).round() as i64
}
