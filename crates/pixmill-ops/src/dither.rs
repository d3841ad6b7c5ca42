//! Ordered dithering to 16-bit RGB565.
//!
//! A 4x4 Bayer-style threshold is added to each channel before the low
//! bits are dropped, so flat gradients break into a fine pattern instead
//! of bands. Red and blue keep 5 bits, green keeps 6. Alpha is untouched.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_ops::dither::dither565;
//!
//! let mut bitmap = Bitmap::filled(4, 4, 0x808080FF);
//! dither565(&mut bitmap);
//! let px = bitmap.pixel(0, 0).unwrap();
//! assert_eq!(px.r & 0x07, 0);
//! assert_eq!(px.g & 0x03, 0);
//! ```

use tracing::debug;

use pixmill_core::Bitmap;

/// Threshold added at `(x % 4, y % 4)`, row-major.
pub const BAYER_4X4: [u8; 16] = [1, 9, 3, 11, 13, 5, 15, 7, 4, 12, 2, 10, 16, 8, 14, 6];

/// Per-channel masks keeping the RGB565 bits.
const MASKS: [u8; 3] = [0xF8, 0xFC, 0xF8];

/// Dithers RGB down to 5/6/5 bits in place.
pub fn dither565(bitmap: &mut Bitmap) {
    debug!(width = bitmap.width(), height = bitmap.height(), "dither565");
    bitmap.for_each_pixel_mut(|x, y, px| {
        let threshold = BAYER_4X4[(((y & 3) << 2) + (x % 4)) as usize] as u16;
        for (c, mask) in px[..3].iter_mut().zip(MASKS) {
            *c = ((*c as u16 + threshold).min(255) as u8) & mask;
        }
    });
}

/// Alias of [`dither565`]: 16 bits per pixel is the RGB565 layout.
pub fn dither16(bitmap: &mut Bitmap) {
    dither565(bitmap);
}
