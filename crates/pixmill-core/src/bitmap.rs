//! The owned RGBA pixel buffer and its access primitives.
//!
//! A [`Bitmap`] stores `width * height` pixels as interleaved 8-bit RGBA in
//! row-major order, top-to-bottom:
//!
//! ```text
//! Memory: [R G B A R G B A R G B A ...]  ← Row 0
//!         [R G B A R G B A R G B A ...]  ← Row 1
//!         ...
//! ```
//!
//! The invariant `data.len() == width * height * 4` holds for the lifetime of
//! the value. The fields are private; size-changing operations build a new
//! bitmap and swap it in whole, so a new width can never be observed next to
//! an old buffer.
//!
//! # Access primitives
//!
//! - [`Bitmap::pixel_index`] - byte offset of a pixel, `None` when outside
//! - [`Bitmap::get_pixel_color`] / [`Bitmap::set_pixel_color`] - packed
//!   `0xRRGGBBAA` access, failing with [`Error::OutOfBounds`]
//! - [`Bitmap::scan`] / [`Bitmap::scan_mut`] - row-major region iteration,
//!   silently clipped to the bitmap
//! - [`Bitmap::for_each_pixel_mut`] - whole-bitmap point operation, sharded by
//!   rows across threads when the `parallel` feature is on
//!
//! # Usage
//!
//! ```rust
//! use pixmill_core::Bitmap;
//!
//! let mut bitmap = Bitmap::filled(4, 4, 0xFF0000FF);
//! bitmap.set_pixel_color(0x00FF00FF, 1, 2).unwrap();
//! assert_eq!(bitmap.get_pixel_color(1, 2).unwrap(), 0x00FF00FF);
//!
//! let mut count = 0;
//! bitmap.scan(-2, -2, 4, 4, |_x, _y, _idx| count += 1);
//! assert_eq!(count, 4); // only the on-canvas 2x2 corner is visited
//! ```

use crate::color::{int_to_rgba, Rgba};
use crate::rect::Rect;
use crate::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Bytes per pixel.
pub const CHANNELS: usize = 4;

/// An owned 8-bit RGBA raster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Creates a transparent black bitmap.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`. Use
    /// [`Bitmap::try_new`] to handle that case.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// Creates a transparent black bitmap, reporting size overflow.
    pub fn try_new(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Creates a bitmap with every pixel set to the packed `color`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height * 4` overflows `usize`. Use
    /// [`Bitmap::try_filled`] to handle that case.
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        match Self::try_filled(width, height, color) {
            Ok(bitmap) => bitmap,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a bitmap filled with `color`, reporting size overflow.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_core::Bitmap;
    ///
    /// let bitmap = Bitmap::try_filled(2, 2, 0xFF0000FF).unwrap();
    /// assert_eq!(bitmap.get_pixel_color(1, 1).unwrap(), 0xFF0000FF);
    /// assert!(Bitmap::try_filled(u32::MAX, u32::MAX, 0).is_err());
    /// ```
    pub fn try_filled(width: u32, height: u32, color: u32) -> Result<Self> {
        let len = byte_len(width, height)?;
        let px = int_to_rgba(color).to_array();
        let data = px.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps an existing RGBA buffer.
    ///
    /// Fails with [`Error::BufferSize`] unless `data.len() == width * height * 4`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_core::Bitmap;
    ///
    /// assert!(Bitmap::from_raw(2, 1, vec![0; 8]).is_ok());
    /// assert!(Bitmap::from_raw(2, 2, vec![0; 8]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Consumes the bitmap, returning `(width, height, data)`.
    pub fn into_raw(self) -> (u32, u32, Vec<u8>) {
        (self.width, self.height, self.data)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if the bitmap has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The rectangle covering the whole bitmap.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes. The length cannot change through a slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of pixel `(x, y)`, or `None` outside the bitmap.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_core::Bitmap;
    ///
    /// let bitmap = Bitmap::new(10, 10);
    /// assert_eq!(bitmap.pixel_index(3, 2), Some((2 * 10 + 3) * 4));
    /// assert_eq!(bitmap.pixel_index(-1, 0), None);
    /// assert_eq!(bitmap.pixel_index(0, 10), None);
    /// ```
    #[inline]
    pub fn pixel_index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    /// Packed color of pixel `(x, y)`.
    pub fn get_pixel_color(&self, x: i64, y: i64) -> Result<u32> {
        self.pixel(x, y).map(Rgba::to_u32)
    }

    /// Writes a packed color to pixel `(x, y)`.
    pub fn set_pixel_color(&mut self, color: u32, x: i64, y: i64) -> Result<()> {
        self.set_pixel(x, y, int_to_rgba(color))
    }

    /// Color of pixel `(x, y)`.
    pub fn pixel(&self, x: i64, y: i64) -> Result<Rgba> {
        let idx = self
            .pixel_index(x, y)
            .ok_or_else(|| Error::out_of_bounds(x, y, self.width, self.height))?;
        Ok(Rgba::from_slice(&self.data[idx..idx + CHANNELS]))
    }

    /// Writes `color` to pixel `(x, y)`.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) -> Result<()> {
        let idx = self
            .pixel_index(x, y)
            .ok_or_else(|| Error::out_of_bounds(x, y, self.width, self.height))?;
        self.data[idx..idx + CHANNELS].copy_from_slice(&color.to_array());
        Ok(())
    }

    /// Sets every pixel to the packed `color`.
    pub fn fill(&mut self, color: u32) {
        let px = int_to_rgba(color).to_array();
        for chunk in self.data.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Visits every pixel of the region `[x, x+w) x [y, y+h)` that lies on
    /// the bitmap, in row-major order.
    ///
    /// The visitor receives `(px, py, byte_index)`. Off-canvas parts of the
    /// region are skipped without error.
    pub fn scan<F>(&self, x: i64, y: i64, w: u32, h: u32, mut visit: F)
    where
        F: FnMut(u32, u32, usize),
    {
        let Some(region) = Rect::new(x, y, w, h).clip(self.width, self.height) else {
            return;
        };
        for py in region.y..region.bottom() {
            for px in region.x..region.right() {
                let idx = (py as usize * self.width as usize + px as usize) * CHANNELS;
                visit(px as u32, py as u32, idx);
            }
        }
    }

    /// Like [`Bitmap::scan`], handing the visitor the pixel's 4 bytes.
    pub fn scan_mut<F>(&mut self, x: i64, y: i64, w: u32, h: u32, mut visit: F)
    where
        F: FnMut(u32, u32, &mut [u8]),
    {
        let Some(region) = Rect::new(x, y, w, h).clip(self.width, self.height) else {
            return;
        };
        let width = self.width as usize;
        for py in region.y..region.bottom() {
            for px in region.x..region.right() {
                let idx = (py as usize * width + px as usize) * CHANNELS;
                visit(px as u32, py as u32, &mut self.data[idx..idx + CHANNELS]);
            }
        }
    }

    /// Applies `f(x, y, pixel)` to every pixel.
    ///
    /// Rows are processed on the rayon pool when the `parallel` feature is
    /// enabled. The call returns only after every row is done.
    pub fn for_each_pixel_mut<F>(&mut self, f: F)
    where
        F: Fn(u32, u32, &mut [u8]) + Send + Sync,
    {
        let row_len = self.width as usize * CHANNELS;
        if row_len == 0 {
            return;
        }

        let per_row = |(y, row): (usize, &mut [u8])| {
            for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                f(x as u32, y as u32, px);
            }
        };

        #[cfg(feature = "parallel")]
        self.data.par_chunks_mut(row_len).enumerate().for_each(per_row);

        #[cfg(not(feature = "parallel"))]
        self.data.chunks_mut(row_len).enumerate().for_each(per_row);
    }

    /// Row `y` as a byte slice.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let row_len = self.width as usize * CHANNELS;
        let start = y as usize * row_len;
        &self.data[start..start + row_len]
    }
}

/// `width * height * 4`, checked.
fn byte_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "byte size overflows usize"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let mut bitmap = Bitmap::new(5, 3);
        for (i, color) in [0x1234_5678u32, 0xFFFF_FFFF, 0, 0x00FF_0080].iter().enumerate() {
            let x = i as i64 % 5;
            let y = i as i64 % 3;
            bitmap.set_pixel_color(*color, x, y).unwrap();
            assert_eq!(bitmap.get_pixel_color(x, y).unwrap(), *color);
        }
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut bitmap = Bitmap::new(2, 2);
        assert!(matches!(
            bitmap.get_pixel_color(2, 0),
            Err(Error::OutOfBounds { x: 2, y: 0, .. })
        ));
        assert!(bitmap.set_pixel_color(0, 0, -1).unwrap_err().is_bounds_error());
    }

    #[test]
    fn test_filled_layout() {
        let bitmap = Bitmap::filled(2, 1, 0x0102_0304);
        assert_eq!(bitmap.data(), &[1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn test_try_filled_overflow() {
        let err = Bitmap::try_filled(u32::MAX, u32::MAX, 0).unwrap_err();
        assert!(err.to_string().contains("overflows"));
        let ok = Bitmap::try_filled(3, 2, 0xFF00_00FF).unwrap();
        assert_eq!(ok, Bitmap::filled(3, 2, 0xFF00_00FF));
    }

    #[test]
    fn test_scan_far_offset_visits_nothing() {
        let bitmap = Bitmap::new(4, 4);
        let mut visits = 0;
        bitmap.scan(i64::MAX - 1, i64::MAX - 1, u32::MAX, u32::MAX, |_, _, _| visits += 1);
        assert_eq!(visits, 0);
    }

    #[test]
    fn test_scan_order_and_clipping() {
        let bitmap = Bitmap::new(3, 3);
        let mut visited = Vec::new();
        bitmap.scan(1, 1, 5, 5, |x, y, idx| visited.push((x, y, idx)));
        assert_eq!(
            visited,
            vec![(1, 1, 16), (2, 1, 20), (1, 2, 28), (2, 2, 32)]
        );

        let mut none = 0;
        bitmap.scan(10, 10, 2, 2, |_, _, _| none += 1);
        bitmap.scan(0, 0, 0, 3, |_, _, _| none += 1);
        assert_eq!(none, 0);
    }

    #[test]
    fn test_scan_mut_writes() {
        let mut bitmap = Bitmap::new(4, 4);
        bitmap.scan_mut(-1, -1, 3, 3, |_, _, px| px[0] = 200);
        assert_eq!(bitmap.pixel(1, 1).unwrap().r, 200);
        assert_eq!(bitmap.pixel(2, 2).unwrap().r, 0);
    }

    #[test]
    fn test_for_each_pixel_mut_coordinates() {
        let mut bitmap = Bitmap::new(7, 5);
        bitmap.for_each_pixel_mut(|x, y, px| {
            px[0] = x as u8;
            px[1] = y as u8;
        });
        let px = bitmap.pixel(6, 4).unwrap();
        assert_eq!((px.r, px.g), (6, 4));
    }

    #[test]
    fn test_from_raw_validates() {
        let err = Bitmap::from_raw(3, 3, vec![0; 35]).unwrap_err();
        assert!(matches!(err, Error::BufferSize { expected: 36, actual: 35, .. }));
        let (w, h, data) = Bitmap::from_raw(1, 1, vec![9, 8, 7, 6]).unwrap().into_raw();
        assert_eq!((w, h, data), (1, 1, vec![9, 8, 7, 6]));
    }
}
