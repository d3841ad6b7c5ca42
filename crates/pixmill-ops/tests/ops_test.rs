//! Cross-module tests for geometry, compositing and resampling.

use pixmill_core::{Bitmap, Rect};
use pixmill_ops::composite::{blit, composite};
use pixmill_ops::resize::{contain, cover, resize, ResizeMode, AUTO};
use pixmill_ops::transform::{autocrop, crop, flip, rotate, AutocropOptions};
use pixmill_ops::{adjust, color, dither, filter, ColorAction};

fn checker(w: u32, h: u32) -> Bitmap {
    let mut bitmap = Bitmap::new(w, h);
    bitmap.for_each_pixel_mut(|x, y, px| {
        let on = (x / 2 + y / 2) % 2 == 0;
        let v = if on { 230 } else { 20 };
        px.copy_from_slice(&[v, (x * 7) as u8, (y * 11) as u8, 255]);
    });
    bitmap
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_crop_then_composite_restores_region() {
    let original = checker(16, 12);
    let region = crop(&original, 3, 4, 6, 5, 0).unwrap();

    let mut canvas = original.clone();
    canvas.scan_mut(3, 4, 6, 5, |_, _, px| px.copy_from_slice(&[0, 0, 0, 255]));
    composite(&mut canvas, &region, 3, 4);

    assert_eq!(canvas, original);
}

#[test]
fn test_autocrop_two_pixel_white_border() {
    let inner = checker(10, 6);
    let mut framed = Bitmap::filled(14, 10, 0xFFFFFFFF);
    blit(&mut framed, &inner, 2, 2, None);

    let cropped = autocrop(&framed, &AutocropOptions::default()).unwrap();
    assert_eq!(cropped.dimensions(), (10, 6));
    assert_eq!(cropped, inner);
}

#[test]
fn test_rotate_round_trip_quarter_turns() {
    let src = checker(9, 5);
    let mut img = src.clone();
    for _ in 0..4 {
        img = rotate(&img, 90.0, true, 0).unwrap();
    }
    assert_eq!(img, src);

    let there = rotate(&src, 180.0, false, 0).unwrap();
    let mut flipped = src.clone();
    flip(&mut flipped, true, true);
    assert_eq!(there, flipped);
}

#[test]
fn test_rotate_without_resize_non_square_quarter() {
    let src = Bitmap::filled(8, 4, 0xFF0000FF);
    let out = rotate(&src, 90.0, false, 0x00FF00FF).unwrap();
    assert_eq!(out.dimensions(), (8, 4));
    // The rotated 4x8 footprint is narrower than the canvas
    assert_eq!(out.get_pixel_color(0, 2).unwrap(), 0x00FF00FF);
    assert_eq!(out.get_pixel_color(4, 2).unwrap(), 0xFF0000FF);
}

// ============================================================================
// Resampling
// ============================================================================

#[test]
fn test_resize_auto_aspect() {
    let src = Bitmap::new(200, 400);
    let dst = resize(&src, AUTO, 100.into(), ResizeMode::Bicubic).unwrap();
    assert_eq!(dst.dimensions(), (50, 100));
}

#[test]
fn test_contain_pads_with_background() {
    let src = Bitmap::filled(40, 20, 0xFF0000FF);
    let out = contain(&src, 30, 30, ResizeMode::Bilinear, 0x0000FFFF).unwrap();
    assert_eq!(out.dimensions(), (30, 30));
    // 30x15 content centered vertically: rows 8..23 (rounded half up)
    assert_eq!(out.get_pixel_color(15, 0).unwrap(), 0x0000FFFF);
    assert_eq!(out.get_pixel_color(15, 15).unwrap(), 0xFF0000FF);
    assert_eq!(out.get_pixel_color(15, 29).unwrap(), 0x0000FFFF);
}

#[test]
fn test_cover_exact_size() {
    let src = checker(37, 13);
    for (w, h) in [(10, 10), (50, 5), (5, 50)] {
        assert_eq!(cover(&src, w, h, ResizeMode::Hermite).unwrap().dimensions(), (w, h));
    }
}

// ============================================================================
// Filters and color
// ============================================================================

#[test]
fn test_invalid_parameters_leave_bitmap_untouched() {
    let src = checker(6, 6);
    let mut img = src.clone();
    assert!(adjust::posterize(&mut img, 1).is_err());
    assert!(adjust::brightness(&mut img, 2.0).is_err());
    assert!(filter::gaussian(&mut img, 0.0).is_err());
    assert!(color::apply_actions(&mut img, &[ColorAction::Mix {
        color: pixmill_core::Rgba::WHITE,
        amount: 120.0,
    }])
    .is_err());
    assert_eq!(img, src);
}

#[test]
fn test_point_ops_preserve_alpha() {
    let mut img = checker(5, 5);
    img.scan_mut(0, 0, 5, 5, |x, _, px| px[3] = x as u8 * 50);
    let alphas: Vec<u8> = img.data().chunks(4).map(|px| px[3]).collect();

    adjust::sepia(&mut img);
    adjust::invert(&mut img);
    dither::dither565(&mut img);
    color::apply_actions(&mut img, &[ColorAction::Spin(45.0), ColorAction::Greyscale]).unwrap();

    let after: Vec<u8> = img.data().chunks(4).map(|px| px[3]).collect();
    assert_eq!(alphas, after);
}

#[test]
fn test_blit_crop_partially_outside_source() {
    let src = checker(4, 4);
    let mut dst = Bitmap::new(6, 6);
    blit(&mut dst, &src, 1, 1, Some(Rect::new(2, 2, 5, 5)));
    assert_eq!(dst.pixel(1, 1).unwrap(), src.pixel(2, 2).unwrap());
    assert_eq!(dst.pixel(2, 2).unwrap(), src.pixel(3, 3).unwrap());
    assert_eq!(dst.get_pixel_color(3, 3).unwrap(), 0);
}
