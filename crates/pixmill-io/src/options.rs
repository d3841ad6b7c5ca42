//! Encoder configuration.

use std::fmt;
use std::str::FromStr;

use pixmill_core::{int_to_rgba, Bitmap};

use crate::IoError;

/// PNG row filter.
///
/// Discriminants match the conventional numbering, with `Auto = -1`
/// letting the encoder pick per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PngFilter {
    /// Adaptive per-row choice.
    #[default]
    Auto = -1,
    /// No filtering.
    None = 0,
    /// Difference to the left pixel.
    Sub = 1,
    /// Difference to the pixel above.
    Up = 2,
    /// Average of left and above.
    Average = 3,
    /// Paeth predictor.
    Paeth = 4,
}

impl PngFilter {
    /// Numeric code, `-1` for [`PngFilter::Auto`].
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Looks up a filter by numeric code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PngFilter::Auto),
            0 => Some(PngFilter::None),
            1 => Some(PngFilter::Sub),
            2 => Some(PngFilter::Up),
            3 => Some(PngFilter::Average),
            4 => Some(PngFilter::Paeth),
            _ => None,
        }
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            PngFilter::Auto => "auto",
            PngFilter::None => "none",
            PngFilter::Sub => "sub",
            PngFilter::Up => "up",
            PngFilter::Average => "average",
            PngFilter::Paeth => "paeth",
        }
    }
}

impl fmt::Display for PngFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PngFilter {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(PngFilter::Auto),
            "none" => Ok(PngFilter::None),
            "sub" => Ok(PngFilter::Sub),
            "up" => Ok(PngFilter::Up),
            "average" | "avg" => Ok(PngFilter::Average),
            "paeth" => Ok(PngFilter::Paeth),
            other => Err(IoError::UnsupportedFormat(format!("PNG filter '{other}'"))),
        }
    }
}

/// Options applied by [`crate::encode`].
///
/// Each codec reads only the fields it understands.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodeOptions {
    /// JPEG quality, 0-100.
    pub quality: u8,
    /// PNG deflate level, 0-9.
    pub deflate_level: u8,
    /// PNG row filter.
    pub filter_type: PngFilter,
    /// Keep the alpha channel (PNG). When false, pixels are flattened
    /// over `background`.
    pub use_alpha: bool,
    /// Packed RGBA color that transparent pixels are flattened onto.
    pub background: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: 100,
            deflate_level: 9,
            filter_type: PngFilter::Auto,
            use_alpha: true,
            background: 0x0000_0000,
        }
    }
}

impl EncodeOptions {
    /// Sets JPEG quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Sets PNG deflate level.
    pub fn with_deflate_level(mut self, level: u8) -> Self {
        self.deflate_level = level;
        self
    }

    /// Sets PNG row filter.
    pub fn with_filter(mut self, filter: PngFilter) -> Self {
        self.filter_type = filter;
        self
    }

    /// Keeps or drops the alpha channel.
    pub fn with_alpha(mut self, use_alpha: bool) -> Self {
        self.use_alpha = use_alpha;
        self
    }

    /// Sets the flattening background.
    pub fn with_background(mut self, background: u32) -> Self {
        self.background = background;
        self
    }

    /// Rejects out-of-range values.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.quality > 100 {
            return Err(IoError::EncodeError(format!(
                "quality {} is outside [0, 100]",
                self.quality
            )));
        }
        if self.deflate_level > 9 {
            return Err(IoError::EncodeError(format!(
                "deflate level {} is outside [0, 9]",
                self.deflate_level
            )));
        }
        Ok(())
    }
}

/// Packed RGB bytes with alpha blended over `background`.
pub(crate) fn flatten_rgb(bitmap: &Bitmap, background: u32) -> Vec<u8> {
    let bg = int_to_rgba(background);
    let bg = [bg.r, bg.g, bg.b];
    bitmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as u32;
            let mut out = [0u8; 3];
            for c in 0..3 {
                out[c] = ((px[c] as u32 * a + bg[c] as u32 * (255 - a) + 127) / 255) as u8;
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = EncodeOptions::default();
        assert_eq!(opts.quality, 100);
        assert_eq!(opts.deflate_level, 9);
        assert_eq!(opts.filter_type, PngFilter::Auto);
        assert!(opts.use_alpha);
        assert!(opts.validate().is_ok());
        assert!(opts.with_deflate_level(10).validate().is_err());
    }

    #[test]
    fn test_filter_codes() {
        for code in -1..=4 {
            let filter = PngFilter::from_code(code).unwrap();
            assert_eq!(filter.code(), code);
            assert_eq!(filter.as_str().parse::<PngFilter>().unwrap(), filter);
        }
        assert!(PngFilter::from_code(5).is_none());
    }

    #[test]
    fn test_flatten_over_background() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap.set_pixel_color(0xFF0000FF, 0, 0).unwrap();
        // Fully transparent pixel takes the background color
        let rgb = flatten_rgb(&bitmap, 0x00FF00FF);
        assert_eq!(rgb, vec![255, 0, 0, 0, 255, 0]);
    }
}
