//! PNG format support.
//!
//! Decodes every PNG color type (palette and low bit depths are expanded,
//! 16-bit samples keep their high byte) and encodes 8-bit RGBA or RGB.
//!
//! # Example
//!
//! ```rust
//! use pixmill_core::Bitmap;
//! use pixmill_io::{png, EncodeOptions};
//!
//! let bitmap = Bitmap::filled(4, 4, 0x11223344);
//! let bytes = png::encode(&bitmap, &EncodeOptions::default()).unwrap();
//! assert_eq!(png::decode(&bytes).unwrap(), bitmap);
//! ```

use std::io::Cursor;

use pixmill_core::Bitmap;
use tracing::debug;

use crate::options::flatten_rgb;
use crate::{EncodeOptions, IoError, IoResult, PngFilter};

/// Decodes PNG bytes into an RGBA bitmap.
pub fn decode(bytes: &[u8]) -> IoResult<Bitmap> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let samples = &buf[..info.buffer_size()];

    // 16-bit samples are big-endian; keep the high byte
    let samples: Vec<u8> = match info.bit_depth {
        png::BitDepth::Eight => samples.to_vec(),
        png::BitDepth::Sixteen => samples.iter().step_by(2).copied().collect(),
        other => {
            return Err(IoError::DecodeError(format!(
                "unexpected bit depth {other:?} after expansion"
            )));
        }
    };

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => samples,
        png::ColorType::Rgb => samples
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        png::ColorType::Grayscale => samples.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => samples
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
            .collect(),
        other => {
            return Err(IoError::DecodeError(format!(
                "unexpected color type {other:?} after expansion"
            )));
        }
    };

    debug!(width = info.width, height = info.height, color_type = ?info.color_type, "png decode");
    Bitmap::from_raw(info.width, info.height, rgba).map_err(|e| IoError::DecodeError(e.to_string()))
}

/// Encodes a bitmap as 8-bit PNG.
///
/// Writes RGBA when `options.use_alpha` is set, otherwise RGB flattened
/// over `options.background`.
pub fn encode(bitmap: &Bitmap, options: &EncodeOptions) -> IoResult<Vec<u8>> {
    options.validate()?;
    if bitmap.is_empty() {
        return Err(IoError::EncodeError("cannot encode an empty bitmap".into()));
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, bitmap.width(), bitmap.height());
        encoder.set_color(if options.use_alpha {
            png::ColorType::Rgba
        } else {
            png::ColorType::Rgb
        });
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(compression(options.deflate_level));
        encoder.set_filter(filter(options.filter_type));

        let mut writer = encoder
            .write_header()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;

        if options.use_alpha {
            writer.write_image_data(bitmap.data())
        } else {
            writer.write_image_data(&flatten_rgb(bitmap, options.background))
        }
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

        writer
            .finish()
            .map_err(|e| IoError::EncodeError(e.to_string()))?;
    }

    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        deflate_level = options.deflate_level,
        filter = %options.filter_type,
        alpha = options.use_alpha,
        bytes = out.len(),
        "png encode"
    );
    Ok(out)
}

/// Maps a 0-9 deflate level onto the encoder presets.
fn compression(level: u8) -> png::Compression {
    match level {
        0 => png::Compression::NoCompression,
        1 => png::Compression::Fastest,
        2..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Balanced,
        _ => png::Compression::High,
    }
}

fn filter(filter: PngFilter) -> png::Filter {
    match filter {
        PngFilter::Auto => png::Filter::Adaptive,
        PngFilter::None => png::Filter::NoFilter,
        PngFilter::Sub => png::Filter::Sub,
        PngFilter::Up => png::Filter::Up,
        PngFilter::Average => png::Filter::Avg,
        PngFilter::Paeth => png::Filter::Paeth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> Bitmap {
        let mut bitmap = Bitmap::new(w, h);
        bitmap.for_each_pixel_mut(|x, y, px| {
            px.copy_from_slice(&[(x * 20) as u8, (y * 30) as u8, 128, (x * 10 + 50) as u8]);
        });
        bitmap
    }

    #[test]
    fn test_lossless_every_filter_and_level() {
        let src = gradient(7, 5);
        for code in -1..=4 {
            for level in [0, 5, 9] {
                let opts = EncodeOptions::default()
                    .with_filter(PngFilter::from_code(code).unwrap())
                    .with_deflate_level(level);
                let bytes = encode(&src, &opts).unwrap();
                assert_eq!(decode(&bytes).unwrap(), src, "filter {code} level {level}");
            }
        }
    }

    #[test]
    fn test_rgb_output_is_opaque() {
        let src = gradient(3, 3);
        let bytes = encode(&src, &EncodeOptions::default().with_alpha(false)).unwrap();
        let back = decode(&bytes).unwrap();
        assert!(back.data().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode(b"not a png"), Err(IoError::DecodeError(_))));
    }
}
