//! Geometric transformation operations.
//!
//! Provides crop, border detection, flips and rotation.
//!
//! # Operations
//!
//! - [`crop`] - Extract a region, padding off-canvas parts with a fill color
//! - [`autocrop_bounds`] / [`autocrop`] - Strip uniform borders
//! - [`flip`] - Mirror rows and/or columns in place
//! - [`rotate`] - Arbitrary rotation, optionally growing the canvas
//! - [`rotate_90_cw`] / [`rotate_90_ccw`] / [`rotate_180`] - Exact quarter turns
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_ops::transform::{crop, flip};
//!
//! let mut src = Bitmap::filled(64, 64, 0x808080FF);
//!
//! // Flip horizontally
//! flip(&mut src, true, false);
//!
//! // Crop center region
//! let cropped = crop(&src, 16, 16, 32, 32, 0).unwrap();
//! assert_eq!(cropped.dimensions(), (32, 32));
//! ```

use pixmill_core::color::{color_diff, int_to_rgba};
use pixmill_core::{limit255, Bitmap, Rect, Rgba, CHANNELS};
use tracing::debug;

use crate::guard::{ensure_dimensions, ensure_unit};
use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};

/// Crops a `w` x `h` region whose top-left corner is `(x, y)`.
///
/// Parts of the region that fall outside `src` are filled with the packed
/// `background` color.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::transform::crop;
///
/// let src = Bitmap::filled(4, 4, 0xFF0000FF);
/// let out = crop(&src, 2, 2, 4, 4, 0x00000000).unwrap();
/// assert_eq!(out.get_pixel_color(1, 1).unwrap(), 0xFF0000FF);
/// assert_eq!(out.get_pixel_color(3, 3).unwrap(), 0x00000000);
/// ```
pub fn crop(src: &Bitmap, x: i64, y: i64, w: u32, h: u32, background: u32) -> OpsResult<Bitmap> {
    ensure_dimensions("crop", w, h)?;
    debug!(x, y, w, h, "crop");

    let mut dst = Bitmap::try_filled(w, h, background)?;
    let region = Rect::new(x, y, w, h);
    if let Some(overlap) = region.clip(src.width(), src.height()) {
        let row_bytes = overlap.width as usize * CHANNELS;
        let dst_w = w as usize;
        let src_w = src.width() as usize;
        let data = dst.data_mut();
        for sy in overlap.y..overlap.bottom() {
            let s = (sy as usize * src_w + overlap.x as usize) * CHANNELS;
            let d = ((sy - y) as usize * dst_w + (overlap.x - x) as usize) * CHANNELS;
            data[d..d + row_bytes].copy_from_slice(&src.data()[s..s + row_bytes]);
        }
    }
    Ok(dst)
}

/// Options for uniform border detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutocropOptions {
    /// Maximum [`color_diff`] (0-1) for a pixel to count as border color.
    pub tolerance: f64,
    /// Only crop when all four sides have a border.
    pub frames_only: bool,
}

impl Default for AutocropOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.0002,
            frames_only: false,
        }
    }
}

/// Finds the region left after stripping uniform borders.
///
/// Each side is scanned inward while every pixel of the current line
/// matches (within `tolerance`) the first pixel of that side's outermost
/// line. Top and bottom are resolved first; left and right then only look
/// at the surviving rows. At least one row and one column always remain.
///
/// Returns the full bounds when nothing is cropped.
pub fn autocrop_bounds(src: &Bitmap, options: &AutocropOptions) -> OpsResult<Rect> {
    ensure_unit("autocrop tolerance", options.tolerance)?;
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return Ok(src.bounds());
    }

    let px = |x: u32, y: u32| {
        let idx = (y as usize * w as usize + x as usize) * CHANNELS;
        Rgba::from_slice(&src.data()[idx..idx + CHANNELS])
    };
    let matches = |target: Rgba, c: Rgba| color_diff(target, c) <= options.tolerance;
    let row_uniform = |y: u32, target: Rgba| (0..w).all(|x| matches(target, px(x, y)));

    let mut north = 0;
    let top = px(0, 0);
    while north < h - 1 && row_uniform(north, top) {
        north += 1;
    }

    let mut south = 0;
    let bottom = px(0, h - 1);
    while north + south < h - 1 && row_uniform(h - 1 - south, bottom) {
        south += 1;
    }

    let rows = north..h - south;
    let col_uniform = |x: u32, target: Rgba| rows.clone().all(|y| matches(target, px(x, y)));

    let mut west = 0;
    let left = px(0, north);
    while west < w - 1 && col_uniform(west, left) {
        west += 1;
    }

    let mut east = 0;
    let right = px(w - 1, north);
    while west + east < w - 1 && col_uniform(w - 1 - east, right) {
        east += 1;
    }

    debug!(north, south, west, east, "autocrop borders");

    if options.frames_only && [north, south, west, east].contains(&0) {
        return Ok(src.bounds());
    }

    Ok(Rect::new(
        west as i64,
        north as i64,
        w - west - east,
        h - north - south,
    ))
}

/// Strips uniform borders; see [`autocrop_bounds`].
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::transform::{autocrop, AutocropOptions};
///
/// let mut src = Bitmap::filled(10, 10, 0xFFFFFFFF);
/// src.scan_mut(2, 2, 6, 6, |_, _, px| px.copy_from_slice(&[0, 0, 0, 255]));
/// let out = autocrop(&src, &AutocropOptions::default()).unwrap();
/// assert_eq!(out.dimensions(), (6, 6));
/// ```
pub fn autocrop(src: &Bitmap, options: &AutocropOptions) -> OpsResult<Bitmap> {
    let bounds = autocrop_bounds(src, options)?;
    if bounds == src.bounds() {
        return Ok(src.clone());
    }
    crop(src, bounds.x, bounds.y, bounds.width, bounds.height, 0)
}

/// Mirrors the bitmap in place: `horizontal` reverses each row,
/// `vertical` reverses the row order.
pub fn flip(bitmap: &mut Bitmap, horizontal: bool, vertical: bool) {
    let (w, h) = (bitmap.width() as usize, bitmap.height() as usize);
    let row_len = w * CHANNELS;
    if row_len == 0 {
        return;
    }

    if horizontal {
        for_each_row(bitmap.data_mut(), row_len, |_, row| {
            for x in 0..w / 2 {
                let mirror = w - 1 - x;
                for c in 0..CHANNELS {
                    row.swap(x * CHANNELS + c, mirror * CHANNELS + c);
                }
            }
        });
    }

    if vertical {
        let data = bitmap.data_mut();
        for y in 0..h / 2 {
            let (upper, lower) = data.split_at_mut((h - 1 - y) * row_len);
            upper[y * row_len..(y + 1) * row_len].swap_with_slice(&mut lower[..row_len]);
        }
    }
}

/// Rotates the bitmap by 90 degrees clockwise.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::transform::rotate_90_cw;
///
/// let src = Bitmap::new(4, 2);
/// let dst = rotate_90_cw(&src);
/// assert_eq!(dst.dimensions(), (2, 4)); // Now 2x4
/// ```
pub fn rotate_90_cw(src: &Bitmap) -> Bitmap {
    let (w, h) = src.dimensions();
    remap(src, h, w, |x, y| (y, h as usize - 1 - x))
}

/// Rotates the bitmap by 90 degrees counter-clockwise.
pub fn rotate_90_ccw(src: &Bitmap) -> Bitmap {
    let (w, h) = src.dimensions();
    remap(src, h, w, |x, y| (w as usize - 1 - y, x))
}

/// Rotates the bitmap by 180 degrees.
pub fn rotate_180(src: &Bitmap) -> Bitmap {
    let (w, h) = src.dimensions();
    remap(src, w, h, |x, y| (w as usize - 1 - x, h as usize - 1 - y))
}

/// Builds a `new_w x new_h` bitmap where each destination pixel `(x, y)`
/// copies source pixel `source(x, y)`.
fn remap<F>(src: &Bitmap, new_w: u32, new_h: u32, source: F) -> Bitmap
where
    F: Fn(usize, usize) -> (usize, usize) + Send + Sync,
{
    let src_w = src.width() as usize;
    let mut dst = Bitmap::new(new_w, new_h);
    for_each_row(dst.data_mut(), new_w as usize * CHANNELS, |y, row| {
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let (sx, sy) = source(x, y);
            let s = (sy * src_w + sx) * CHANNELS;
            px.copy_from_slice(&src.data()[s..s + CHANNELS]);
        }
    });
    dst
}

/// Rotates clockwise by `degrees`.
///
/// Multiples of 90 degrees are exact pixel permutations. Other angles map
/// each destination pixel back into the source and sample bilinearly;
/// samples falling off the source read `background`.
///
/// With `resize_canvas` the output grows to the bounding box of the rotated
/// rectangle. Without it the output keeps the input size, rotating about
/// the center and clipping the corners.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::transform::rotate;
///
/// let src = Bitmap::filled(10, 20, 0xFF0000FF);
/// assert_eq!(rotate(&src, 90.0, true, 0).unwrap().dimensions(), (20, 10));
/// assert_eq!(rotate(&src, 45.0, true, 0).unwrap().dimensions(), (22, 22));
/// assert_eq!(rotate(&src, 45.0, false, 0).unwrap().dimensions(), (10, 20));
/// ```
pub fn rotate(src: &Bitmap, degrees: f64, resize_canvas: bool, background: u32) -> OpsResult<Bitmap> {
    if !degrees.is_finite() {
        return Err(OpsError::InvalidParameter(format!(
            "rotate: angle {degrees} is not finite"
        )));
    }
    let deg = degrees.rem_euclid(360.0);
    debug!(degrees = deg, resize_canvas, "rotate");

    if src.is_empty() {
        return Ok(src.clone());
    }

    let square = src.width() == src.height();
    match deg {
        d if d == 0.0 => return Ok(src.clone()),
        d if d == 180.0 => return Ok(rotate_180(src)),
        d if d == 90.0 && (resize_canvas || square) => return Ok(rotate_90_cw(src)),
        d if d == 270.0 && (resize_canvas || square) => return Ok(rotate_90_ccw(src)),
        _ => {}
    }

    let (sin, cos) = deg.to_radians().sin_cos();
    let (w, h) = (src.width() as f64, src.height() as f64);
    let (out_w, out_h) = if resize_canvas {
        (
            bounding_side(w * cos.abs() + h * sin.abs()),
            bounding_side(w * sin.abs() + h * cos.abs()),
        )
    } else {
        src.dimensions()
    };

    ensure_dimensions("rotate", out_w, out_h)?;

    let bg = int_to_rgba(background).to_array();
    let (src_cx, src_cy) = (w / 2.0, h / 2.0);
    let (dst_cx, dst_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);

    let mut data = vec![0u8; out_w as usize * out_h as usize * CHANNELS];
    for_each_row(&mut data, out_w as usize * CHANNELS, |y, row| {
        let dy = y as f64 + 0.5 - dst_cy;
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let dx = x as f64 + 0.5 - dst_cx;
            let sx = dx * cos + dy * sin + src_cx - 0.5;
            let sy = -dx * sin + dy * cos + src_cy - 0.5;
            px.copy_from_slice(&sample_bilinear(src, sx, sy, bg));
        }
    });

    Ok(Bitmap::from_raw(out_w, out_h, data)?)
}

/// Rounds a rotated extent up, ignoring floating point noise.
fn bounding_side(extent: f64) -> u32 {
    ((extent - 1e-9).ceil() as u32).max(1)
}

/// Bilinear sample at pixel-center coordinates; off-canvas taps read `bg`.
fn sample_bilinear(src: &Bitmap, sx: f64, sy: f64, bg: [u8; 4]) -> [u8; 4] {
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let tap = |x: i64, y: i64| -> [u8; 4] {
        match src.pixel_index(x, y) {
            Some(i) => [src.data()[i], src.data()[i + 1], src.data()[i + 2], src.data()[i + 3]],
            None => bg,
        }
    };
    let p00 = tap(x0, y0);
    let p10 = tap(x0 + 1, y0);
    let p01 = tap(x0, y0 + 1);
    let p11 = tap(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..CHANNELS {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = limit255(top * (1.0 - fy) + bottom * fy);
    }
    out
}
