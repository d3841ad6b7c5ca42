//! # pixmill-compare
//!
//! Similarity measures between bitmaps.
//!
//! - [`phash`] - 64-bit perceptual hash, printable in radix 2 to 64, with
//!   normalized Hamming distance
//! - [`diff`] - pixel-by-pixel YIQ comparison producing a visualization
//!   and the fraction of differing pixels
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_compare::{diff, distance, DiffOptions};
//!
//! let a = Bitmap::filled(32, 32, 0x204060FF);
//! let b = a.clone();
//!
//! assert_eq!(distance(&a, &b).unwrap(), 0.0);
//! assert_eq!(diff(&a, &b, &DiffOptions::default()).unwrap().percent, 0.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

pub mod diff;
pub mod phash;

pub use diff::{diff, diff_fitted, DiffOptions, DiffResult};
pub use error::{CompareError, CompareResult};
pub use phash::{distance, phash, Phash};
