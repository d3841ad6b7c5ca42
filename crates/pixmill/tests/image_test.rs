//! End-to-end behavior of the chainable Image API.

use approx::assert_relative_eq;
use pixmill::{ColorAction, Image, Mime, ResizeMode, Rgba, AUTO};
use tempfile::tempdir;

fn pattern(w: u32, h: u32) -> Image {
    let mut img = Image::new(w, h);
    img.scan_mut(0, 0, w, h, |x, y, px| {
        let band = if (x / 3 + y / 3) % 2 == 0 { 40 } else { 210 };
        px.copy_from_slice(&[band, (x * 9) as u8, (y * 7) as u8, 255]);
    });
    img
}

// ============================================================================
// Pixel access
// ============================================================================

#[test]
fn test_set_then_get_round_trip() {
    let mut img = Image::new(5, 4);
    for (i, color) in [0x00000000u32, 0xFFFFFFFF, 0x12345678, 0x80FF0001].iter().enumerate() {
        img.set_pixel_color(*color, i as i64, 3).unwrap();
        assert_eq!(img.get_pixel_color(i as i64, 3).unwrap(), *color);
        assert_eq!(img.get_pixel_colour(i as i64, 3).unwrap(), *color);
    }
    assert!(img.get_pixel_color(5, 0).is_err());
    assert!(img.set_pixel_colour(0, -1, 0).is_err());
    assert_eq!(img.get_pixel_index(1, 1), Some(24));
    assert_eq!(img.get_pixel_index(0, 4), None);
}

// ============================================================================
// Involutions
// ============================================================================

#[test]
fn test_flip_twice_is_identity() {
    let original = pattern(7, 5);
    let mut img = original.clone();
    img.flip(true, false).flip(true, false);
    assert_eq!(img, original);
    img.mirror(false, true).mirror(false, true);
    assert_eq!(img, original);
}

#[test]
fn test_invert_twice_is_identity() {
    let mut original = pattern(6, 6);
    original.scan_mut(0, 0, 6, 6, |x, _, px| px[3] = 40 * x as u8);
    let mut img = original.clone();
    img.invert();
    let alphas = |img: &Image| img.bitmap().data().chunks(4).map(|px| px[3]).collect::<Vec<_>>();
    assert_eq!(alphas(&img), alphas(&original));
    img.invert();
    assert_eq!(img, original);
}

#[test]
fn test_rotate_full_turn() {
    let original = pattern(9, 6);
    let mut img = original.clone();
    img.rotate(360.0, true).unwrap();
    assert_eq!(img.dimensions(), original.dimensions());
    assert_eq!(img.bitmap(), original.bitmap());

    img.rotate(-90.0, true).unwrap().rotate(90.0, true).unwrap();
    assert_eq!(img.bitmap(), original.bitmap());
}

// ============================================================================
// Geometry and resampling
// ============================================================================

#[test]
fn test_resize_auto_width() {
    let mut img = Image::new(200, 400);
    img.resize(AUTO, 100, ResizeMode::NearestNeighbor).unwrap();
    assert_eq!(img.width(), 50);
    assert_eq!(img.height(), 100);
}

#[test]
fn test_crop_composite_restores_region() {
    let original = pattern(20, 14);
    let mut region = original.clone();
    region.crop(4, 3, 8, 6).unwrap();

    let mut canvas = original.clone();
    canvas.scan_mut(4, 3, 8, 6, |_, _, px| px.copy_from_slice(&[255, 0, 255, 255]));
    canvas.composite(&region, 4, 3);
    assert_eq!(canvas, original);
}

#[test]
fn test_autocrop_removes_white_frame() {
    let inner = pattern(12, 8);
    let mut framed = Image::filled(16, 12, 0xFFFFFFFF);
    framed.blit(&inner, 2, 2);

    framed.autocrop().unwrap();
    assert_eq!(framed.dimensions(), (12, 8));
    assert_eq!(framed.bitmap(), inner.bitmap());
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_greyscale_red() {
    let mut img = Image::filled(4, 4, 0xFF0000FF);
    img.greyscale();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(img.get_pixel_color(x, y).unwrap(), 0x363636FF);
        }
    }
    let mut alias = Image::filled(4, 4, 0xFF0000FF);
    alias.grayscale();
    assert_eq!(alias, img);
}

#[test]
fn test_color_pipeline_and_alias() {
    let mut a = Image::filled(3, 3, 0x3366CCFF);
    let mut b = a.clone();
    let actions = [ColorAction::Spin(180.0), ColorAction::Lighten(20.0)];
    a.color(&actions).unwrap();
    b.colour(&actions).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.get_pixel_color(0, 0).unwrap(), 0x3366CCFF);

    let before = a.clone();
    let bad = [ColorAction::Greyscale, ColorAction::Darken(-5.0)];
    assert!(a.color(&bad).unwrap_err().is_invalid_parameter());
    assert_eq!(a, before);
}

#[test]
fn test_mask_by_brightness() {
    let mut img = Image::filled(2, 1, 0xFF0000FF);
    let mut mask = Image::new(2, 1);
    mask.set_pixel_color(0xFFFFFFFF, 0, 0).unwrap();
    mask.set_pixel_color(0x000000FF, 1, 0).unwrap();
    img.mask(&mask, 0, 0);
    assert_eq!(img.bitmap().pixel(0, 0).unwrap(), Rgba::new(255, 0, 0, 255));
    assert_eq!(img.bitmap().pixel(1, 0).unwrap().a, 0);
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn test_self_comparison_is_zero() {
    let img = pattern(40, 30);
    assert_eq!(pixmill::distance(&img, &img).unwrap(), 0.0);
    let result = pixmill::diff(&img, &img, 0.1).unwrap();
    assert_eq!(result.percent, 0.0);
    assert_eq!(result.image.dimensions(), (40, 30));
}

#[test]
fn test_independent_hashes_match() {
    let a = pattern(33, 21);
    let b = pattern(33, 21);
    for radix in [2, 16, 36, 64] {
        assert_eq!(a.hash(radix).unwrap(), b.hash(radix).unwrap());
    }
    assert!(a.hash(1).is_err());
}

#[test]
fn test_diff_size_mismatch() {
    let a = pattern(20, 20);
    let b = pattern(10, 10);
    assert!(pixmill::diff(&a, &b, 0.1).is_err());

    let fitted = pixmill::diff_fitted(&a, &b, 0.1).unwrap();
    assert_eq!(fitted.image.dimensions(), (10, 10));
    assert!(fitted.percent <= 1.0);
}

#[test]
fn test_diff_counts_changed_pixels() {
    let a = Image::filled(10, 10, 0xFFFFFFFF);
    let mut b = a.clone();
    b.scan_mut(0, 0, 5, 2, |_, _, px| px.copy_from_slice(&[0, 0, 0, 255]));
    let result = pixmill::diff(&a, &b, 0.1).unwrap();
    assert_relative_eq!(result.percent, 0.1);
}

// ============================================================================
// Codecs
// ============================================================================

#[test]
fn test_write_then_read() {
    let dir = tempdir().unwrap();
    let mut img = pattern(16, 12);
    img.set_pixel_color(0x11223344, 0, 0).unwrap();

    for name in ["a.png", "a.bmp"] {
        let path = dir.path().join(name);
        img.write(&path).unwrap();
        let back = Image::read(path.to_str().unwrap()).unwrap();
        assert_eq!(back.bitmap(), img.bitmap(), "{name}");
    }

    let path = dir.path().join("a.jpg");
    img.quality(90).unwrap().write(&path).unwrap();
    let back = Image::read(path.to_str().unwrap()).unwrap();
    assert_eq!(back.original_mime(), Some(Mime::Jpeg));
    assert_eq!(back.dimensions(), (16, 12));
}

#[test]
fn test_flattened_png() {
    let mut img = Image::new(3, 3);
    img.rgba(false).background(0x00FF00FF);
    let back = Image::from_bytes(&img.encode(Mime::Png).unwrap()).unwrap();
    assert_eq!(back.get_pixel_color(1, 1).unwrap(), 0x00FF00FF);
}

#[test]
fn test_url_locator_rejected() {
    let err = Image::read("http://example.com/x.png").unwrap_err();
    assert!(matches!(err, pixmill::Error::Io(_)));
    assert!(err.to_string().contains("unsupported"));
}

#[cfg(feature = "serde")]
#[test]
fn test_actions_from_json() {
    let json = r#"[{"apply":"spin","params":90.0},{"apply":"greyscale"}]"#;
    let actions: Vec<ColorAction> = serde_json::from_str(json).unwrap();
    assert_eq!(actions, vec![ColorAction::Spin(90.0), ColorAction::Greyscale]);
}
