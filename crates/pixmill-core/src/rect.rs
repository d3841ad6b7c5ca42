//! Rectangle type for regions of a bitmap.
//!
//! Used for scan regions, crop windows and blit/composite overlap
//! computation. The origin is signed because callers routinely place
//! sources partly off-canvas (negative offsets) and expect silent clipping.
//!
//! # Coordinate System
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │  Bitmap  │
//!   │   │  Region  │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use pixmill_core::Rect;
//!
//! let rect = Rect::new(-5, 10, 20, 20);
//! let clipped = rect.clip(8, 16).unwrap();
//! assert_eq!(clipped, Rect::new(0, 10, 8, 6));
//! ```

/// A rectangle defined by a signed origin and unsigned dimensions.
///
/// A rectangle with zero width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: i64,
    /// Y coordinate of the top edge (inclusive)
    pub y: i64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle covering a whole `width` x `height` bitmap.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the X coordinate one past the right edge.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.x.saturating_add(self.width as i64)
    }

    /// Returns the Y coordinate one past the bottom edge.
    #[inline]
    pub const fn bottom(&self) -> i64 {
        self.y.saturating_add(self.height as i64)
    }

    /// Returns the number of pixels covered.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Checks whether the point lies inside the rectangle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_core::Rect;
    ///
    /// let rect = Rect::new(0, 0, 10, 10);
    /// assert!(rect.contains(9, 9));
    /// assert!(!rect.contains(10, 0));
    /// ```
    #[inline]
    pub const fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Returns a copy moved by `(dx, dy)`.
    #[inline]
    pub const fn translate(&self, dx: i64, dy: i64) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Returns the overlapping region of two rectangles, if any.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, (right - x) as u32, (bottom - y) as u32))
        } else {
            None
        }
    }

    /// Clips the rectangle to a `width` x `height` bitmap.
    ///
    /// Returns `None` when nothing of the rectangle lies on the bitmap.
    #[inline]
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        self.intersect(&Rect::from_size(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 5, 5, 5)));

        let far = Rect::new(20, 20, 5, 5);
        assert_eq!(a.intersect(&far), None);

        // Touching edges do not overlap
        let touching = Rect::new(10, 0, 5, 5);
        assert_eq!(a.intersect(&touching), None);
    }

    #[test]
    fn test_clip_negative_origin() {
        let r = Rect::new(-4, -4, 6, 6);
        assert_eq!(r.clip(10, 10), Some(Rect::new(0, 0, 2, 2)));
        assert_eq!(Rect::new(-10, 0, 5, 5).clip(10, 10), None);
    }

    #[test]
    fn test_metrics() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!(r.right(), 6);
        assert_eq!(r.bottom(), 8);
        assert_eq!(r.area(), 20);
        assert!(!r.is_empty());
        assert!(Rect::new(0, 0, 0, 3).is_empty());
        assert_eq!(r.translate(-2, -3), Rect::new(0, 0, 4, 5));
    }

    #[test]
    fn test_edges_saturate() {
        let r = Rect::new(i64::MAX - 1, i64::MAX - 2, 10, 10);
        assert_eq!(r.right(), i64::MAX);
        assert_eq!(r.bottom(), i64::MAX);
        assert!(!r.contains(i64::MAX, i64::MAX - 1));
        assert_eq!(r.clip(100, 100), None);
        assert_eq!(r.translate(5, 5).x, i64::MAX);
    }
}
