//! # pixmill
//!
//! In-memory RGBA raster engine: resample, crop, rotate, composite, filter,
//! dither, recolor, hash and diff images.
//!
//! The [`Image`] type owns a bitmap and its output settings and exposes
//! every operation as a chainable method. The free functions [`distance`]
//! and [`diff`] compare two images.
//!
//! # Crates
//!
//! - `pixmill-core` - [`Bitmap`], [`Rgba`], [`Rect`] and pixel access
//! - `pixmill-ops` - raster operations
//! - `pixmill-compare` - perceptual hash and pixel diff
//! - `pixmill-io` - PNG, JPEG and BMP codecs
//!
//! # Example
//!
//! ```rust
//! use pixmill::{Image, Mime, ResizeMode};
//!
//! let mut img = Image::filled(64, 48, 0xFF8800FF);
//! img.contain(32, 32, ResizeMode::Bicubic)?
//!     .rotate(90.0, true)?
//!     .sepia();
//!
//! let copy = img.clone();
//! assert_eq!(pixmill::distance(&img, &copy)?, 0.0);
//! assert_eq!(pixmill::diff(&img, &copy, 0.1)?.percent, 0.0);
//!
//! let png = img.encode(Mime::Png)?;
//! assert_eq!(Image::from_bytes(&png)?.bitmap(), img.bitmap());
//! # Ok::<(), pixmill::Error>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - rayon row sharding for point operations (default)
//! - `png`, `jpeg`, `bmp` - codecs (default)
//! - `serde` - serialization for options, MIME types and color actions

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod image;

pub use error::{Error, Result};
pub use image::Image;

pub use pixmill_compare::{DiffOptions, Phash};
pub use pixmill_core::{int_to_rgba, rgba_to_int, Bitmap, Rect, Rgba};
pub use pixmill_io::{EncodeOptions, Mime, PngFilter};
pub use pixmill_ops::{AutocropOptions, ColorAction, ColorParam, Dim, ResizeMode, AUTO};

/// Outcome of [`diff`].
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    /// Visualization: red differences, yellow anti-aliasing, faded rest.
    pub image: Image,
    /// Fraction of differing pixels in `[0, 1]`.
    pub percent: f64,
}

/// Normalized Hamming distance between the perceptual hashes of two images.
///
/// Images may differ in size.
pub fn distance(a: &Image, b: &Image) -> Result<f64> {
    Ok(pixmill_compare::distance(a.bitmap(), b.bitmap())?)
}

/// Pixel diff of two equally sized images at `threshold` in `[0, 1]`.
///
/// Fails on a size mismatch; see [`diff_fitted`] to resample instead.
pub fn diff(a: &Image, b: &Image, threshold: f64) -> Result<Diff> {
    let result = pixmill_compare::diff(
        a.bitmap(),
        b.bitmap(),
        &DiffOptions::with_threshold(threshold),
    )?;
    Ok(Diff {
        image: Image::from_bitmap(result.image),
        percent: result.percent,
    })
}

/// Like [`diff`], resizing the larger image down to the smaller first.
pub fn diff_fitted(a: &Image, b: &Image, threshold: f64) -> Result<Diff> {
    let result = pixmill_compare::diff_fitted(
        a.bitmap(),
        b.bitmap(),
        &DiffOptions::with_threshold(threshold),
    )?;
    Ok(Diff {
        image: Image::from_bitmap(result.image),
        percent: result.percent,
    })
}
