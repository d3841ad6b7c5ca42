//! # pixmill-ops
//!
//! Raster operations over [`pixmill_core::Bitmap`].
//!
//! Size-changing operations (resize, crop, rotate) return a new bitmap;
//! the rest mutate the bitmap in place. Fallible operations validate
//! their parameters before touching any pixel.
//!
//! # Modules
//!
//! - [`resize`] - Resampling with five kernels, scale/fit/cover/contain
//! - [`transform`] - Crop, autocrop, flip, rotate
//! - [`composite`] - Blit, source-over composite, brightness mask
//! - [`filter`] - Gaussian and fast box blur
//! - [`adjust`] - Brightness, contrast, posterize, greyscale, sepia, alpha
//! - [`dither`] - Ordered RGB565 dithering
//! - [`color`] - Named color action pipeline
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_ops::{adjust, resize, transform, ResizeMode};
//!
//! let src = Bitmap::filled(200, 400, 0x3366CCFF);
//!
//! // Resize preserving aspect ratio
//! let mut small = resize::resize(&src, resize::AUTO, 100.into(), ResizeMode::Bilinear).unwrap();
//! assert_eq!(small.dimensions(), (50, 100));
//!
//! // Mirror and grey out
//! transform::flip(&mut small, true, false);
//! adjust::greyscale(&mut small);
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - shard rows across rayon workers (default)
//! - `serde` - serialization for [`ResizeMode`] and [`ColorAction`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod parallel;

pub mod adjust;
pub mod color;
pub mod composite;
pub mod dither;
pub mod filter;
pub mod guard;
pub mod resize;
pub mod transform;

pub use color::{ColorAction, ColorParam, ColorPipeline};
pub use error::{OpsError, OpsResult};
pub use resize::{Dim, ResizeMode, AUTO};
pub use transform::AutocropOptions;
