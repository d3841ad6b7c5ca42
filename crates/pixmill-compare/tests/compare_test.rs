//! Hash and diff behavior on realistic edits.

use pixmill_compare::{diff, diff_fitted, distance, phash, DiffOptions, Phash};
use pixmill_core::Bitmap;
use pixmill_ops::resize::{resize_exact, ResizeMode};
use pixmill_ops::{adjust, filter};

fn scene(w: u32, h: u32) -> Bitmap {
    let mut bitmap = Bitmap::filled(w, h, 0xF0F0F0FF);
    // dark block in the upper left, mid block lower right
    bitmap.scan_mut(0, 0, w / 2, h / 3, |_, _, px| px.copy_from_slice(&[20, 30, 40, 255]));
    bitmap.scan_mut((w / 2) as i64, (h / 2) as i64, w / 3, h / 3, |_, _, px| {
        px.copy_from_slice(&[120, 60, 200, 255])
    });
    bitmap
}

// ============================================================================
// Hashing
// ============================================================================

#[test]
fn test_independent_hashes_match() {
    let first = phash(&scene(80, 60)).unwrap();
    let second = phash(&scene(80, 60)).unwrap();
    for radix in [2, 10, 16, 64] {
        assert_eq!(first.to_radix(radix).unwrap(), second.to_radix(radix).unwrap());
    }
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_hash_robust_to_resize_and_blur() {
    let src = scene(128, 96);
    let smaller = resize_exact(&src, 96, 72, ResizeMode::Bicubic).unwrap();
    let mut blurred = src.clone();
    filter::blur(&mut blurred, 1).unwrap();

    assert!(distance(&src, &smaller).unwrap() <= 0.2);
    assert!(distance(&src, &blurred).unwrap() <= 0.2);
}

#[test]
fn test_radix_text_parses_back() {
    let hash = phash(&scene(40, 40)).unwrap();
    let text = hash.to_radix(36).unwrap();
    assert_eq!(Phash::from_radix(&text, 36).unwrap(), hash);
    assert!(hash.to_radix(1).is_err());
}

// ============================================================================
// Diffing
// ============================================================================

#[test]
fn test_diff_self_is_zero() {
    let img = scene(30, 20);
    let result = diff(&img, &img, &DiffOptions::default()).unwrap();
    assert_eq!(result.percent, 0.0);
    assert_eq!(result.image.dimensions(), (30, 20));
}

#[test]
fn test_diff_counts_changed_block() {
    let a = Bitmap::filled(10, 10, 0xFFFFFFFF);
    let mut b = a.clone();
    b.scan_mut(2, 2, 5, 4, |_, _, px| px.copy_from_slice(&[0, 0, 0, 255]));

    let result = diff(&a, &b, &DiffOptions::default()).unwrap();
    assert_eq!(result.diff_pixels, 20);
    assert_eq!(result.percent, 0.2);
}

#[test]
fn test_diff_inverted_is_total() {
    let a = Bitmap::filled(6, 6, 0x000000FF);
    let mut b = a.clone();
    adjust::invert(&mut b);
    let result = diff(&a, &b, &DiffOptions::default()).unwrap();
    assert_eq!(result.percent, 1.0);
}

#[test]
fn test_diff_requires_matching_size() {
    let a = scene(20, 20);
    let b = scene(10, 10);
    assert!(diff(&a, &b, &DiffOptions::default()).unwrap_err().is_dimension_mismatch());
    let fitted = diff_fitted(&b, &a, &DiffOptions::with_threshold(0.3)).unwrap();
    assert_eq!(fitted.image.dimensions(), (10, 10));
}
