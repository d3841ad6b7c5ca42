//! Perceptual hashing.
//!
//! The hash captures coarse visual structure and survives re-encoding,
//! small resizes and mild color shifts:
//!
//! 1. Resample to 32x32 (bilinear) and convert to BT.709 greyscale
//! 2. Run a 2-D DCT-II and keep the 8x8 lowest frequencies
//! 3. Set one bit per coefficient that exceeds the median of the 63
//!    AC coefficients, row-major, most significant bit first
//!
//! Hashes print in any radix from 2 to 64 using the alphabet
//! `0-9 a-z A-Z _ -`, left-padded to a fixed length per radix.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_compare::phash::{phash, Phash};
//!
//! let bitmap = Bitmap::filled(64, 64, 0x336699FF);
//! let hash = phash(&bitmap).unwrap();
//! let text = hash.to_radix(16).unwrap();
//! assert_eq!(text.len(), 16);
//! assert_eq!(Phash::from_radix(&text, 16).unwrap(), hash);
//! ```

use std::f64::consts::PI;
use std::fmt;

use pixmill_core::Bitmap;
use pixmill_ops::adjust::greyscale;
use pixmill_ops::resize::{resize_exact, ResizeMode};
use tracing::debug;

use crate::{CompareError, CompareResult};

/// Number of bits in a hash.
pub const HASH_BITS: u32 = 64;

/// Digits for radix 2 through 64.
pub const RADIX_ALPHABET: &[u8; 64] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_-";

/// Side of the greyscale sample grid.
const SAMPLE: usize = 32;

/// Side of the retained low-frequency block.
const LOW: usize = 8;

/// A 64-bit perceptual hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Phash(u64);

impl Phash {
    /// Wraps raw hash bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw hash bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Encodes the hash in `radix`, left-padded with `0` to
    /// [`canonical_len`] digits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixmill_compare::phash::Phash;
    ///
    /// let hash = Phash::from_bits(255);
    /// assert_eq!(hash.to_radix(16).unwrap(), "00000000000000ff");
    /// assert_eq!(hash.to_radix(64).unwrap(), "0000000003-");
    /// assert!(hash.to_radix(65).is_err());
    /// ```
    pub fn to_radix(self, radix: u32) -> CompareResult<String> {
        let len = canonical_len(radix)?;
        let base = radix as u64;

        let mut digits = Vec::with_capacity(len);
        let mut value = self.0;
        while value > 0 {
            digits.push(RADIX_ALPHABET[(value % base) as usize]);
            value /= base;
        }
        digits.resize(len.max(digits.len()), b'0');
        digits.reverse();
        Ok(digits.into_iter().map(char::from).collect())
    }

    /// Decodes text produced by [`Phash::to_radix`].
    pub fn from_radix(text: &str, radix: u32) -> CompareResult<Self> {
        canonical_len(radix)?;
        let base = radix as u64;
        let invalid = |why: &str| {
            CompareError::InvalidParameter(format!("hash '{text}' in radix {radix}: {why}"))
        };

        if text.is_empty() {
            return Err(invalid("empty"));
        }

        let mut value: u64 = 0;
        for ch in text.bytes() {
            let digit = RADIX_ALPHABET[..radix as usize]
                .iter()
                .position(|&d| d == ch)
                .ok_or_else(|| invalid("digit outside alphabet"))?;
            value = value
                .checked_mul(base)
                .and_then(|v| v.checked_add(digit as u64))
                .ok_or_else(|| invalid("more than 64 bits"))?;
        }
        Ok(Self(value))
    }

    /// Normalized Hamming distance: differing bits / 64.
    pub fn distance(&self, other: &Phash) -> f64 {
        (self.0 ^ other.0).count_ones() as f64 / HASH_BITS as f64
    }
}

impl fmt::Display for Phash {
    /// Radix 64, the most compact form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_radix(64).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Digits needed for 64 bits in `radix`: `ceil(64 / log2(radix))`.
///
/// Fails with `InvalidParameter` outside `2..=64`.
///
/// # Example
///
/// ```rust
/// use pixmill_compare::phash::canonical_len;
///
/// assert_eq!(canonical_len(2).unwrap(), 64);
/// assert_eq!(canonical_len(10).unwrap(), 20);
/// assert_eq!(canonical_len(64).unwrap(), 11);
/// ```
pub fn canonical_len(radix: u32) -> CompareResult<usize> {
    if !(2..=64).contains(&radix) {
        return Err(CompareError::InvalidParameter(format!(
            "radix {radix} is outside [2, 64]"
        )));
    }
    Ok((HASH_BITS as f64 / (radix as f64).log2()).ceil() as usize)
}

/// Computes the perceptual hash of `bitmap`.
///
/// Fails if the bitmap is empty.
pub fn phash(bitmap: &Bitmap) -> CompareResult<Phash> {
    let mut sample = resize_exact(bitmap, SAMPLE as u32, SAMPLE as u32, ResizeMode::Bilinear)?;
    greyscale(&mut sample);

    let grey: Vec<f64> = sample.data().chunks_exact(4).map(|px| px[0] as f64).collect();
    let coeffs = dct_low(&grey);

    let mut ac: Vec<f64> = coeffs[1..].to_vec();
    ac.sort_by(f64::total_cmp);
    let median = ac[ac.len() / 2];

    let bits = coeffs
        .iter()
        .fold(0u64, |acc, &c| (acc << 1) | u64::from(c > median));

    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        median,
        hash = bits,
        "phash"
    );
    Ok(Phash(bits))
}

/// Normalized Hamming distance between the hashes of two bitmaps.
///
/// 0 means identical hashes; bitmaps may differ in size.
pub fn distance(a: &Bitmap, b: &Bitmap) -> CompareResult<f64> {
    Ok(phash(a)?.distance(&phash(b)?))
}

/// DCT-II of a `SAMPLE x SAMPLE` grid, returning the top-left
/// `LOW x LOW` block row-major.
fn dct_low(grey: &[f64]) -> Vec<f64> {
    let cos: Vec<[f64; SAMPLE]> = (0..LOW)
        .map(|u| {
            let mut row = [0.0; SAMPLE];
            for (i, v) in row.iter_mut().enumerate() {
                *v = ((2 * i + 1) as f64 * u as f64 * PI / (2 * SAMPLE) as f64).cos();
            }
            row
        })
        .collect();
    let scale = |u: usize| if u == 0 { std::f64::consts::FRAC_1_SQRT_2 } else { 1.0 };

    let mut out = Vec::with_capacity(LOW * LOW);
    for u in 0..LOW {
        for v in 0..LOW {
            let mut sum = 0.0;
            for i in 0..SAMPLE {
                let row = &grey[i * SAMPLE..(i + 1) * SAMPLE];
                let partial: f64 = row.iter().zip(&cos[v]).map(|(f, c)| f * c).sum();
                sum += cos[u][i] * partial;
            }
            out.push(scale(u) * scale(v) / 4.0 * sum);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient(w: u32, h: u32) -> Bitmap {
        let mut bitmap = Bitmap::new(w, h);
        bitmap.for_each_pixel_mut(|x, y, px| {
            let v = ((x * 255) / w.max(1)) as u8;
            let g = ((y * 255) / h.max(1)) as u8;
            px.copy_from_slice(&[v, g, 255 - v, 255]);
        });
        bitmap
    }

    #[test]
    fn test_canonical_lengths() {
        assert_eq!(canonical_len(16).unwrap(), 16);
        assert_eq!(canonical_len(3).unwrap(), 41);
        assert!(canonical_len(1).is_err());
        assert!(canonical_len(0).is_err());
    }

    #[test]
    fn test_radix_round_trip() {
        let hash = Phash::from_bits(0xDEAD_BEEF_0123_4567);
        for radix in [2, 3, 7, 10, 16, 36, 63, 64] {
            let text = hash.to_radix(radix).unwrap();
            assert_eq!(text.len(), canonical_len(radix).unwrap(), "radix {radix}");
            assert_eq!(Phash::from_radix(&text, radix).unwrap(), hash);
        }
        assert_eq!(Phash::from_bits(u64::MAX).to_radix(2).unwrap(), "1".repeat(64));
    }

    #[test]
    fn test_from_radix_rejects() {
        assert!(Phash::from_radix("", 16).is_err());
        assert!(Phash::from_radix("g", 16).is_err());
        // 17 hex digits overflow
        assert!(Phash::from_radix("10000000000000000", 16).is_err());
    }

    #[test]
    fn test_distance_bits() {
        let a = Phash::from_bits(0);
        assert_eq!(a.distance(&a), 0.0);
        assert_relative_eq!(a.distance(&Phash::from_bits(0xFF)), 8.0 / 64.0);
        assert_relative_eq!(a.distance(&Phash::from_bits(u64::MAX)), 1.0);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let img = gradient(50, 40);
        let first = phash(&img).unwrap();
        let second = phash(&img.clone()).unwrap();
        assert_eq!(first.to_radix(64).unwrap(), second.to_radix(64).unwrap());
        assert_eq!(distance(&img, &img).unwrap(), 0.0);
    }

    #[test]
    fn test_inverse_flips_most_bits() {
        let mut img = Bitmap::new(64, 64);
        img.for_each_pixel_mut(|x, y, px| {
            let v = ((x ^ y) * 4) as u8;
            px.copy_from_slice(&[v, v, v, 255]);
        });
        let mut inverse = img.clone();
        inverse.for_each_pixel_mut(|_, _, px| {
            for c in &mut px[..3] {
                *c = 255 - *c;
            }
        });
        let d = distance(&img, &inverse).unwrap();
        assert!(d > 0.5, "distance {d}");
    }

    #[test]
    fn test_empty_bitmap_fails() {
        assert!(phash(&Bitmap::new(0, 0)).is_err());
    }
}
