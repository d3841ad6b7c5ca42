//! # pixmill-io
//!
//! Codec boundary for pixmill: turns bytes into [`Bitmap`]s and back.
//!
//! # Modules
//!
//! - [`detect`] - MIME sniffing from magic bytes and extensions
//! - [`options`] - Encoder options and PNG filter codes
//! - [`png`] - PNG codec (`png` feature)
//! - [`jpeg`] - JPEG codec (`jpeg` feature)
//! - [`bmp`] - Uncompressed BMP codec (`bmp` feature)
//!
//! # Quick Start
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_io::{decode, encode, EncodeOptions, Mime};
//!
//! let bitmap = Bitmap::filled(8, 8, 0xFF8800FF);
//! let bytes = encode(&bitmap, Mime::Png, &EncodeOptions::default()).unwrap();
//!
//! assert_eq!(Mime::from_magic(&bytes), Some(Mime::Png));
//! assert_eq!(decode(&bytes).unwrap(), bitmap);
//! ```
//!
//! # Feature Flags
//!
//! - `png`, `jpeg`, `bmp` - individual codecs (all default)
//! - `serde` - serialization for [`Mime`], [`PngFilter`], [`EncodeOptions`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

pub mod detect;
pub mod options;

#[cfg(feature = "bmp")]
pub mod bmp;
#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png")]
pub mod png;

use std::path::Path;

use pixmill_core::Bitmap;
use tracing::debug;

pub use detect::Mime;
pub use error::{IoError, IoResult};
pub use options::{EncodeOptions, PngFilter};

/// Decodes an image, sniffing the format from its magic bytes.
pub fn decode(bytes: &[u8]) -> IoResult<Bitmap> {
    let mime = Mime::from_magic(bytes)
        .ok_or_else(|| IoError::UnsupportedFormat("unrecognized image signature".into()))?;
    decode_as(bytes, mime)
}

/// Decodes an image of a known type.
pub fn decode_as(bytes: &[u8], mime: Mime) -> IoResult<Bitmap> {
    debug!(mime = %mime, len = bytes.len(), "decode");
    match mime {
        #[cfg(feature = "png")]
        Mime::Png => png::decode(bytes),
        #[cfg(feature = "jpeg")]
        Mime::Jpeg => jpeg::decode(bytes),
        #[cfg(feature = "bmp")]
        Mime::Bmp => bmp::decode(bytes),
        #[allow(unreachable_patterns)]
        other => Err(disabled(other)),
    }
}

/// Encodes a bitmap as `mime`.
pub fn encode(bitmap: &Bitmap, mime: Mime, options: &EncodeOptions) -> IoResult<Vec<u8>> {
    debug!(mime = %mime, width = bitmap.width(), height = bitmap.height(), "encode");
    match mime {
        #[cfg(feature = "png")]
        Mime::Png => png::encode(bitmap, options),
        #[cfg(feature = "jpeg")]
        Mime::Jpeg => jpeg::encode(bitmap, options),
        #[cfg(feature = "bmp")]
        Mime::Bmp => bmp::encode(bitmap, options),
        #[allow(unreachable_patterns)]
        other => {
            let _ = options;
            Err(disabled(other))
        }
    }
}

fn disabled(mime: Mime) -> IoError {
    IoError::UnsupportedFormat(format!("{mime} support is not compiled in"))
}

/// Reads the raw bytes behind a locator.
///
/// Only filesystem paths are served; `http://`, `https://` and other
/// URL schemes fail with [`IoError::UnsupportedFormat`].
pub fn fetch_bytes(locator: &str) -> IoResult<Vec<u8>> {
    if let Some((scheme, _)) = locator.split_once("://") {
        if scheme != "file" {
            return Err(IoError::UnsupportedFormat(format!(
                "cannot fetch '{locator}': {scheme} locators are not supported"
            )));
        }
    }
    let path = locator.strip_prefix("file://").unwrap_or(locator);
    let bytes = std::fs::read(path)?;
    debug!(path, len = bytes.len(), "fetch");
    Ok(bytes)
}

/// Reads and decodes an image file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Bitmap> {
    decode(&std::fs::read(path.as_ref())?)
}

/// Encodes and writes an image file, choosing the format from the extension.
pub fn write<P: AsRef<Path>>(path: P, bitmap: &Bitmap, options: &EncodeOptions) -> IoResult<()> {
    let path = path.as_ref();
    let mime = Mime::from_path(path).ok_or_else(|| {
        IoError::UnsupportedFormat(format!("no known format for '{}'", path.display()))
    })?;
    std::fs::write(path, encode(bitmap, mime, options)?)?;
    Ok(())
}
