//! # pixmill-core
//!
//! Core types for in-memory RGBA raster processing.
//!
//! This crate provides the foundational types used throughout pixmill:
//!
//! - [`Bitmap`] - owned `width x height` RGBA8 buffer with bounds-checked
//!   pixel access and region scanning
//! - [`Rgba`] - a single color, with `0xRRGGBBAA` packing helpers
//! - [`Rect`] - signed-origin region used for clipping
//! - [`Error`] - bounds, size and parameter failures
//!
//! ## Crate Structure
//!
//! ```text
//! pixmill-core (this crate)
//!    ^
//!    |
//!    +-- pixmill-ops (resample, geometry, composite, filters, color)
//!    +-- pixmill-compare (perceptual hash, pixel diff)
//!    +-- pixmill-io (codec boundary)
//!    +-- pixmill (Image wrapper)
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - row-sharded [`Bitmap::for_each_pixel_mut`] via rayon (default)
//! - `serde` - serialization for [`Rgba`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bitmap;
pub mod color;
pub mod error;
pub mod rect;

pub use bitmap::{Bitmap, CHANNELS};
pub use color::{int_to_rgba, limit255, rgba_to_int, Rgba};
pub use error::{Error, Result};
pub use rect::Rect;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitmap::Bitmap;
    pub use crate::color::{color_diff, int_to_rgba, limit255, luminance_rec709, rgba_to_int, Rgba};
    pub use crate::error::{Error, Result};
    pub use crate::rect::Rect;
}
