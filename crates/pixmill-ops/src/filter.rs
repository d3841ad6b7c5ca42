//! Blur filters.
//!
//! Both filters are separable: a horizontal pass over rows, then the same
//! pass over the transposed buffer for the vertical direction. Channels,
//! alpha included, are filtered independently without premultiplication.
//! Samples past the edge clamp to the nearest edge pixel.
//!
//! - [`gaussian`] - true Gaussian convolution, cost grows with the radius
//! - [`blur`] - two sliding-window box passes, cost independent of radius
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_ops::filter::{blur, gaussian};
//!
//! let mut bitmap = Bitmap::filled(16, 16, 0x336699FF);
//! gaussian(&mut bitmap, 2.0).unwrap();
//! blur(&mut bitmap, 3).unwrap();
//! assert_eq!(bitmap.get_pixel_color(8, 8).unwrap(), 0x336699FF);
//! ```

use pixmill_core::{limit255, Bitmap, CHANNELS};
use tracing::debug;

use crate::guard::ensure_at_least;
use crate::parallel::{for_each_row, transpose};
use crate::{OpsError, OpsResult};

/// Number of box passes [`blur`] runs.
const BOX_ITERATIONS: usize = 2;

/// Builds a normalized 1-D Gaussian kernel with `sigma = radius`.
///
/// The kernel spans `ceil(2.57 * radius)` taps on each side of the center.
///
/// # Example
///
/// ```rust
/// use pixmill_ops::filter::gaussian_kernel;
///
/// let k = gaussian_kernel(1.0);
/// assert_eq!(k.len(), 7);
/// assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
/// ```
pub fn gaussian_kernel(radius: f64) -> Vec<f32> {
    let half = (radius * 2.57).ceil() as i64;
    let sigma2 = 2.0 * radius * radius;

    let mut weights: Vec<f64> = (-half..=half)
        .map(|i| (-((i * i) as f64) / sigma2).exp())
        .collect();

    // Normalize
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights.into_iter().map(|w| w as f32).collect()
}

/// Applies a Gaussian blur of the given `radius` (sigma) in place.
///
/// Fails with `InvalidParameter` when `radius < 1`.
pub fn gaussian(bitmap: &mut Bitmap, radius: f64) -> OpsResult<()> {
    ensure_at_least("gaussian radius", radius, 1.0)?;
    let kernel = gaussian_kernel(radius);
    let half = kernel.len() / 2;
    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        radius,
        taps = kernel.len(),
        "gaussian"
    );

    let pass = |src: &[f32], dst: &mut [f32]| {
        let len = (src.len() / CHANNELS) as i64;
        for (x, out) in dst.chunks_exact_mut(CHANNELS).enumerate() {
            let mut acc = [0.0f32; CHANNELS];
            for (k, &w) in kernel.iter().enumerate() {
                let sx = (x as i64 + k as i64 - half as i64).clamp(0, len - 1) as usize;
                let px = &src[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                for c in 0..CHANNELS {
                    acc[c] += px[c] * w;
                }
            }
            out.copy_from_slice(&acc);
        }
    };

    separable(bitmap, 1, pass);
    Ok(())
}

/// Applies a fast approximate blur of the given `radius` in place.
///
/// Runs two box blurs of width `2 * radius + 1` in each direction, which
/// approaches a Gaussian while costing the same for any radius.
///
/// Fails with `InvalidParameter` when `radius < 1`.
///
/// # Example
///
/// ```rust
/// use pixmill_core::Bitmap;
/// use pixmill_ops::filter::blur;
///
/// let mut bitmap = Bitmap::new(9, 1);
/// bitmap.set_pixel_color(0xFFFFFFFF, 4, 0).unwrap();
/// blur(&mut bitmap, 1).unwrap();
/// let center = bitmap.pixel(4, 0).unwrap().r;
/// assert!(center > 0 && center < 255);
/// assert_eq!(bitmap.pixel(4, 0).unwrap().r, center);
/// ```
pub fn blur(bitmap: &mut Bitmap, radius: u32) -> OpsResult<()> {
    if radius < 1 {
        return Err(OpsError::InvalidParameter(format!(
            "blur radius: {radius} must be >= 1"
        )));
    }
    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        radius,
        "blur"
    );

    let r = radius as i64;
    let norm = 1.0 / (2 * r + 1) as f64;
    let pass = |src: &[f32], dst: &mut [f32]| {
        let last = (src.len() / CHANNELS) as i64 - 1;
        let at = |i: i64, c: usize| src[i.clamp(0, last) as usize * CHANNELS + c] as f64;
        for c in 0..CHANNELS {
            // Window [-r, r]: taps left of the edge and past the end repeat
            // the edge pixels, so only the in-range middle is summed.
            let inner: f64 = (1..=r.min(last)).map(|i| at(i, c)).sum();
            let mut sum = (r + 1) as f64 * at(0, c)
                + inner
                + (r - last).max(0) as f64 * at(last, c);
            for x in 0..=last {
                dst[x as usize * CHANNELS + c] = (sum * norm) as f32;
                sum += at(x + r + 1, c) - at(x - r, c);
            }
        }
    };

    separable(bitmap, BOX_ITERATIONS, pass);
    Ok(())
}

/// Runs `pass` over every row, then every column, `iterations` times.
///
/// Values stay in f32 between passes and are rounded once at the end.
fn separable<F>(bitmap: &mut Bitmap, iterations: usize, pass: F)
where
    F: Fn(&[f32], &mut [f32]) + Send + Sync,
{
    let (w, h) = (bitmap.width() as usize, bitmap.height() as usize);
    if w == 0 || h == 0 {
        return;
    }

    let mut buf: Vec<f32> = bitmap.data().iter().map(|&v| v as f32).collect();
    let run = |src: &[f32], row_len: usize| {
        let mut out = vec![0.0f32; src.len()];
        for_each_row(&mut out, row_len, |y, row| {
            pass(&src[y * row_len..(y + 1) * row_len], row);
        });
        out
    };

    for _ in 0..iterations {
        let horizontal = run(&buf, w * CHANNELS);
        let columns = transpose(&horizontal, w, h, CHANNELS);
        let vertical = run(&columns, h * CHANNELS);
        buf = transpose(&vertical, h, w, CHANNELS);
    }

    for (dst, v) in bitmap.data_mut().iter_mut().zip(buf) {
        *dst = limit255(v as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pixmill_core::Rgba;

    fn impulse(size: u32) -> Bitmap {
        let mut bitmap = Bitmap::filled(size, size, 0x000000FF);
        let c = (size / 2) as i64;
        bitmap.set_pixel_color(0xFFFFFFFF, c, c).unwrap();
        bitmap
    }

    #[test]
    fn test_kernel_shape() {
        let k = gaussian_kernel(2.0);
        // half-width ceil(5.14) = 6
        assert_eq!(k.len(), 13);
        assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(k[0], k[12]);
        assert!(k[6] > k[5] && k[5] > k[4]);
    }

    #[test]
    fn test_radius_validation() {
        let mut bitmap = Bitmap::new(4, 4);
        assert!(gaussian(&mut bitmap, 0.5).is_err());
        assert!(gaussian(&mut bitmap, f64::NAN).is_err());
        assert!(blur(&mut bitmap, 0).is_err());
    }

    #[test]
    fn test_uniform_unchanged() {
        let src = Bitmap::filled(10, 7, 0x80402010);
        let mut g = src.clone();
        gaussian(&mut g, 3.0).unwrap();
        assert_eq!(g, src);
        let mut b = src.clone();
        blur(&mut b, 4).unwrap();
        assert_eq!(b, src);
    }

    #[test]
    fn test_impulse_spreads_symmetrically() {
        let mut g = impulse(15);
        gaussian(&mut g, 1.5).unwrap();
        let center = g.pixel(7, 7).unwrap().r;
        assert!(center < 255);
        assert_eq!(g.pixel(5, 7).unwrap(), g.pixel(9, 7).unwrap());
        assert_eq!(g.pixel(7, 5).unwrap(), g.pixel(7, 9).unwrap());
        assert!(g.pixel(6, 7).unwrap().r > g.pixel(5, 7).unwrap().r);
        // Alpha stays opaque
        assert_eq!(g.pixel(0, 0).unwrap().a, 255);

        let mut b = impulse(15);
        blur(&mut b, 2).unwrap();
        assert_eq!(b.pixel(6, 7).unwrap(), b.pixel(8, 7).unwrap());
        assert!(b.pixel(7, 7).unwrap().r > b.pixel(7, 3).unwrap().r);
    }

    /// Clamped-edge box average of one channel, applied `BOX_ITERATIONS` times.
    fn naive_box(row: &[f64], r: i64) -> Vec<f64> {
        let last = row.len() as i64 - 1;
        let mut cur = row.to_vec();
        for _ in 0..BOX_ITERATIONS {
            cur = (0..=last)
                .map(|x| {
                    let taps = (x - r..=x + r).map(|i| cur[i.clamp(0, last) as usize]);
                    taps.sum::<f64>() / (2 * r + 1) as f64
                })
                .collect();
        }
        cur
    }

    #[test]
    fn test_blur_matches_naive_window() {
        let reds = [0u8, 255, 40, 200, 90];
        let mut bitmap = Bitmap::new(5, 1);
        for (x, &v) in reds.iter().enumerate() {
            bitmap.set_pixel(x as i64, 0, Rgba::new(v, 0, 0, 255)).unwrap();
        }
        // Radius wider than the row exercises the edge-repeat terms.
        blur(&mut bitmap, 7).unwrap();

        let expected = naive_box(&reds.map(f64::from), 7);
        for (x, want) in expected.iter().enumerate() {
            let got = bitmap.pixel(x as i64, 0).unwrap().r as f64;
            assert!((got - want).abs() <= 1.0, "x={x}: {got} vs {want}");
        }
    }

    #[test]
    fn test_blur_huge_radius() {
        let src = Bitmap::filled(6, 4, 0x336699FF);
        let mut uniform = src.clone();
        blur(&mut uniform, u32::MAX).unwrap();
        assert_eq!(uniform, src);

        // Every window is dominated by the repeated edges, so the row
        // settles on their mean.
        let mut ramp = Bitmap::new(2, 1);
        ramp.set_pixel(0, 0, Rgba::new(0, 0, 0, 255)).unwrap();
        ramp.set_pixel(1, 0, Rgba::new(255, 0, 0, 255)).unwrap();
        blur(&mut ramp, u32::MAX).unwrap();
        for x in 0..2 {
            let px = ramp.pixel(x, 0).unwrap();
            assert!((127..=128).contains(&px.r), "x={x}: {}", px.r);
            assert_eq!(px.a, 255);
        }
    }

    #[test]
    fn test_non_square() {
        let mut bitmap = Bitmap::filled(9, 3, 0x000000FF);
        bitmap.set_pixel_color(0xFF0000FF, 0, 1).unwrap();
        blur(&mut bitmap, 1).unwrap();
        assert_eq!(bitmap.dimensions(), (9, 3));
        assert!(bitmap.pixel(1, 1).unwrap().r > 0);
        assert_eq!(bitmap.pixel(8, 1).unwrap().r, 0);
    }
}
