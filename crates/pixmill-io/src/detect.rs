//! Format detection utilities.
//!
//! Detects MIME types from magic bytes, file extensions and MIME strings.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::IoError;

/// Supported raster MIME types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mime {
    /// `image/png`
    #[cfg_attr(feature = "serde", serde(rename = "image/png"))]
    Png,
    /// `image/jpeg`
    #[cfg_attr(feature = "serde", serde(rename = "image/jpeg"))]
    Jpeg,
    /// `image/bmp`
    #[cfg_attr(feature = "serde", serde(rename = "image/bmp"))]
    Bmp,
}

impl Mime {
    /// All supported types.
    pub const ALL: [Mime; 3] = [Mime::Png, Mime::Jpeg, Mime::Bmp];

    /// The MIME string, e.g. `image/png`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mime::Png => "image/png",
            Mime::Jpeg => "image/jpeg",
            Mime::Bmp => "image/bmp",
        }
    }

    /// Preferred file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Mime::Png => "png",
            Mime::Jpeg => "jpg",
            Mime::Bmp => "bmp",
        }
    }

    /// Sniffs the type from leading magic bytes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_io::Mime;
    ///
    /// assert_eq!(Mime::from_magic(b"\x89PNG\r\n\x1a\n...."), Some(Mime::Png));
    /// assert_eq!(Mime::from_magic(b"BM"), Some(Mime::Bmp));
    /// assert_eq!(Mime::from_magic(b"GIF89a"), None);
    /// ```
    pub fn from_magic(header: &[u8]) -> Option<Self> {
        if header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Mime::Png)
        } else if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Mime::Jpeg)
        } else if header.starts_with(b"BM") {
            Some(Mime::Bmp)
        } else {
            None
        }
    }

    /// Detects the type from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Mime::Png),
            "jpg" | "jpeg" | "jpe" => Some(Mime::Jpeg),
            "bmp" | "dib" => Some(Mime::Bmp),
            _ => None,
        }
    }

    /// Detects the type from a path's extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mime {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Mime::Png),
            "image/jpeg" | "image/jpg" => Ok(Mime::Jpeg),
            "image/bmp" | "image/x-ms-bmp" => Ok(Mime::Bmp),
            other => Err(IoError::UnsupportedFormat(format!("MIME type '{other}'"))),
        }
    }
}
