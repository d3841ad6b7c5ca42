//! Placing one bitmap onto another.
//!
//! # Operations
//!
//! - [`blit`] - Straight copy, overwriting destination alpha
//! - [`composite`] - Porter-Duff source-over blending
//! - [`mask`] - Scale destination alpha by source brightness
//!
//! All three clip silently to the overlap of the two bitmaps, so partial
//! or fully off-canvas placement is never an error.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_ops::composite::{over_pixel, composite};
//!
//! let fg = [1.0, 0.0, 0.0, 0.5]; // Semi-transparent red
//! let bg = [0.0, 0.0, 1.0, 1.0]; // Opaque blue
//! let result = over_pixel(fg, bg);
//! assert!(result[0] > 0.4 && result[2] > 0.4);
//!
//! let mut dst = Bitmap::filled(8, 8, 0x0000FFFF);
//! let src = Bitmap::filled(4, 4, 0xFF000080);
//! composite(&mut dst, &src, 2, 2);
//! ```

use pixmill_core::{limit255, Bitmap, Rect, CHANNELS};
use tracing::{debug, trace};

/// Where a source region lands on the destination.
struct Placement {
    /// Top-left of the copied region in the source.
    src_x: usize,
    src_y: usize,
    /// Top-left of the copied region in the destination.
    dst_x: usize,
    dst_y: usize,
    width: usize,
    height: usize,
}

/// Intersects `region` of `src`, drawn at `(x, y)`, with both bitmaps.
fn place(dst: &Bitmap, src: &Bitmap, x: i64, y: i64, region: Rect) -> Option<Placement> {
    let region = region.clip(src.width(), src.height())?;

    // `(x, y)` is where the source origin lands
    let shifted = Rect::new(x + region.x, y + region.y, region.width, region.height);
    let visible = shifted.clip(dst.width(), dst.height())?;

    Some(Placement {
        src_x: (region.x + visible.x - shifted.x) as usize,
        src_y: (region.y + visible.y - shifted.y) as usize,
        dst_x: visible.x as usize,
        dst_y: visible.y as usize,
        width: visible.width as usize,
        height: visible.height as usize,
    })
}

/// Calls `f(dst_px, src_px)` for every overlapping pixel pair.
fn for_each_overlap<F>(dst: &mut Bitmap, src: &Bitmap, placement: &Placement, mut f: F)
where
    F: FnMut(&mut [u8], &[u8]),
{
    let dst_w = dst.width() as usize;
    let src_w = src.width() as usize;
    let data = dst.data_mut();
    for row in 0..placement.height {
        let s = ((placement.src_y + row) * src_w + placement.src_x) * CHANNELS;
        let d = ((placement.dst_y + row) * dst_w + placement.dst_x) * CHANNELS;
        let len = placement.width * CHANNELS;
        let src_row = &src.data()[s..s + len];
        let dst_row = &mut data[d..d + len];
        for (dp, sp) in dst_row.chunks_exact_mut(CHANNELS).zip(src_row.chunks_exact(CHANNELS)) {
            f(dp, sp);
        }
    }
}

/// Copies `src` (or its `crop` sub-rectangle) onto `dst` at `(x, y)`.
///
/// The crop rectangle is placed so that its top-left corner lands on
/// `(x, y)`. Destination pixels are overwritten, alpha included.
///
/// # Example
///
/// ```rust
/// use pixmill_core::{Bitmap, Rect};
/// use pixmill_ops::composite::blit;
///
/// let mut dst = Bitmap::new(4, 4);
/// let src = Bitmap::filled(4, 4, 0xFF0000FF);
/// blit(&mut dst, &src, 1, 1, Some(Rect::new(0, 0, 2, 2)));
/// assert_eq!(dst.get_pixel_color(2, 2).unwrap(), 0xFF0000FF);
/// assert_eq!(dst.get_pixel_color(3, 3).unwrap(), 0);
/// ```
pub fn blit(dst: &mut Bitmap, src: &Bitmap, x: i64, y: i64, crop: Option<Rect>) {
    let region = crop.unwrap_or_else(|| src.bounds());
    let Some(placement) = place(dst, src, x - region.x, y - region.y, region) else {
        trace!(x, y, "blit: no overlap");
        return;
    };
    debug!(x, y, w = placement.width, h = placement.height, "blit");

    for_each_overlap(dst, src, &placement, |dp, sp| dp.copy_from_slice(sp));
}

/// Composites `fg` over `bg` (Porter-Duff Over), straight alpha in [0, 1].
///
/// `outA = fgA + bgA * (1 - fgA)` and
/// `outC = (fgC * fgA + bgC * bgA * (1 - fgA)) / outA`, with a fully
/// transparent result short-circuiting to zero.
#[inline]
pub fn over_pixel(fg: [f64; 4], bg: [f64; 4]) -> [f64; 4] {
    let fg_a = fg[3];
    let bg_a = bg[3];
    let out_a = fg_a + bg_a * (1.0 - fg_a);

    if out_a <= 0.0 {
        return [0.0, 0.0, 0.0, 0.0];
    }

    let inv_out_a = 1.0 / out_a;
    [
        (fg[0] * fg_a + bg[0] * bg_a * (1.0 - fg_a)) * inv_out_a,
        (fg[1] * fg_a + bg[1] * bg_a * (1.0 - fg_a)) * inv_out_a,
        (fg[2] * fg_a + bg[2] * bg_a * (1.0 - fg_a)) * inv_out_a,
        out_a,
    ]
}

#[inline]
fn to_unit(px: &[u8]) -> [f64; 4] {
    [
        px[0] as f64 / 255.0,
        px[1] as f64 / 255.0,
        px[2] as f64 / 255.0,
        px[3] as f64 / 255.0,
    ]
}

/// Alpha-composites `src` over `dst` with its top-left corner at `(x, y)`.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::composite::composite;
///
/// let mut dst = Bitmap::filled(2, 2, 0x0000FFFF);
/// let src = Bitmap::filled(1, 1, 0xFF0000FF);
/// composite(&mut dst, &src, 1, 0);
/// assert_eq!(dst.get_pixel_color(1, 0).unwrap(), 0xFF0000FF);
/// assert_eq!(dst.get_pixel_color(0, 0).unwrap(), 0x0000FFFF);
/// ```
pub fn composite(dst: &mut Bitmap, src: &Bitmap, x: i64, y: i64) {
    let Some(placement) = place(dst, src, x, y, src.bounds()) else {
        trace!(x, y, "composite: no overlap");
        return;
    };
    debug!(x, y, w = placement.width, h = placement.height, "composite");

    for_each_overlap(dst, src, &placement, |dp, sp| {
        match sp[3] {
            0 => {}
            255 => dp.copy_from_slice(sp),
            _ => {
                let out = over_pixel(to_unit(sp), to_unit(dp));
                for (c, v) in dp.iter_mut().zip(out) {
                    *c = limit255(v * 255.0);
                }
            }
        }
    });
}

/// Uses the brightness of `src` as a transparency mask for `dst`.
///
/// Each overlapping destination alpha is multiplied by the mean of the
/// source pixel's RGB channels over 255. Destination RGB is unchanged.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::composite::mask;
///
/// let mut dst = Bitmap::filled(2, 1, 0xFF0000FF);
/// let black = Bitmap::filled(1, 1, 0x000000FF);
/// mask(&mut dst, &black, 0, 0);
/// assert_eq!(dst.get_pixel_color(0, 0).unwrap(), 0xFF000000);
/// assert_eq!(dst.get_pixel_color(1, 0).unwrap(), 0xFF0000FF);
/// ```
pub fn mask(dst: &mut Bitmap, src: &Bitmap, x: i64, y: i64) {
    let Some(placement) = place(dst, src, x, y, src.bounds()) else {
        trace!(x, y, "mask: no overlap");
        return;
    };
    debug!(x, y, w = placement.width, h = placement.height, "mask");

    for_each_overlap(dst, src, &placement, |dp, sp| {
        let avg = (sp[0] as f64 + sp[1] as f64 + sp[2] as f64) / 3.0;
        dp[3] = limit255(dp[3] as f64 * avg / 255.0);
    });
}
