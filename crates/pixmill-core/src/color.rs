//! RGBA color values and packing helpers.
//!
//! Colors travel through the API either as an [`Rgba`] struct or packed into
//! a single `u32` as `r << 24 | g << 16 | b << 8 | a`, so `0xFF0000FF` is
//! opaque red. [`rgba_to_int`] and [`int_to_rgba`] are exact inverses.
//!
//! Packing never clamps: callers that compute channel values in floating
//! point go through [`limit255`] first.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::color::{int_to_rgba, rgba_to_int, Rgba};
//!
//! let packed = rgba_to_int(255, 128, 0, 255);
//! assert_eq!(packed, 0xFF8000FF);
//! assert_eq!(int_to_rgba(packed), Rgba::new(255, 128, 0, 255));
//! ```

use crate::{Error, Result};

/// Rec.709 luminance coefficient for red channel.
pub const REC709_LUMA_R: f64 = 0.2126;

/// Rec.709 luminance coefficient for green channel.
pub const REC709_LUMA_G: f64 = 0.7152;

/// Rec.709 luminance coefficient for blue channel.
pub const REC709_LUMA_B: f64 = 0.0722;

/// Rec.709 luminance coefficients as an array [R, G, B].
pub const REC709_LUMA: [f64; 3] = [REC709_LUMA_R, REC709_LUMA_G, REC709_LUMA_B];

/// Calculate Rec.709 luma from 8-bit RGB values.
///
/// `Y = 0.2126*R + 0.7152*G + 0.0722*B`, unrounded.
///
/// # Example
/// ```
/// use pixmill_core::color::luminance_rec709;
/// let luma = luminance_rec709(255, 0, 0);
/// assert!((luma - 54.213).abs() < 1e-9);
/// ```
#[inline]
pub fn luminance_rec709(r: u8, g: u8, b: u8) -> f64 {
    r as f64 * REC709_LUMA_R + g as f64 * REC709_LUMA_G + b as f64 * REC709_LUMA_B
}

/// A single 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
    /// Alpha channel (0-255, 255 is opaque)
    pub a: u8,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    /// Creates a color from its four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Packs this color into `r << 24 | g << 16 | b << 8 | a`.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        rgba_to_int(self.r, self.g, self.b, self.a)
    }

    /// Unpacks a color produced by [`Rgba::to_u32`].
    #[inline]
    pub const fn from_u32(packed: u32) -> Self {
        int_to_rgba(packed)
    }

    /// Reads a color from the first four bytes of `px`.
    #[inline]
    pub fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// Returns the channels as `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses a CSS-style hex color.
    ///
    /// Accepts `rgb`, `rgba`, `rrggbb` and `rrggbbaa`, with or without a
    /// leading `#`. Short forms expand each digit (`#06D` is `#0066DD`).
    /// A missing alpha means opaque.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_core::Rgba;
    ///
    /// assert_eq!(Rgba::from_hex("#06D").unwrap(), Rgba::rgb(0x00, 0x66, 0xDD));
    /// assert_eq!(Rgba::from_hex("ff000080").unwrap(), Rgba::new(255, 0, 0, 128));
    /// assert!(Rgba::from_hex("#12").is_err());
    /// ```
    pub fn from_hex(text: &str) -> Result<Self> {
        let hex = text.trim().trim_start_matches('#');
        let invalid = || Error::invalid_parameter(format!("malformed hex color '{text}'"));

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |i: usize| -> Result<u8> {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };
        let byte = |i: usize| -> Result<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl From<u32> for Rgba {
    fn from(packed: u32) -> Self {
        int_to_rgba(packed)
    }
}

impl From<Rgba> for u32 {
    fn from(color: Rgba) -> Self {
        color.to_u32()
    }
}

/// Packs four channels into `r << 24 | g << 16 | b << 8 | a`.
#[inline]
pub const fn rgba_to_int(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) << 24 | (g as u32) << 16 | (b as u32) << 8 | a as u32
}

/// Unpacks a color produced by [`rgba_to_int`].
#[inline]
pub const fn int_to_rgba(packed: u32) -> Rgba {
    Rgba {
        r: (packed >> 24) as u8,
        g: (packed >> 16) as u8,
        b: (packed >> 8) as u8,
        a: packed as u8,
    }
}

/// Clamps a channel value to [0, 255] and rounds it to the nearest integer.
///
/// NaN maps to 0.
///
/// # Example
/// ```
/// use pixmill_core::color::limit255;
/// assert_eq!(limit255(-12.0), 0);
/// assert_eq!(limit255(127.5), 128);
/// assert_eq!(limit255(300.0), 255);
/// ```
#[inline]
pub fn limit255(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round() as u8
}

/// Alpha-aware color difference normalized to [0, 1].
///
/// Each RGB channel contributes `max(dc^2, (dc - da)^2)` so a change in
/// alpha counts even when the color channels match.
///
/// # Example
/// ```
/// use pixmill_core::{color::color_diff, Rgba};
/// assert_eq!(color_diff(Rgba::WHITE, Rgba::WHITE), 0.0);
/// assert!((color_diff(Rgba::WHITE, Rgba::BLACK) - 1.0).abs() < 1e-12);
/// ```
pub fn color_diff(a: Rgba, b: Rgba) -> f64 {
    const MAX: f64 = 255.0 * 255.0 * 3.0;
    let da = a.a as f64 - b.a as f64;
    let channel = |ca: u8, cb: u8| {
        let dc = ca as f64 - cb as f64;
        (dc * dc).max((dc - da) * (dc - da))
    };
    (channel(a.r, b.r) + channel(a.g, b.g) + channel(a.b, b.b)) / MAX
}
