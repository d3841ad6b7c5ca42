//! JPEG format support.
//!
//! Decoding converts greyscale, 16-bit greyscale and CMYK sources to RGBA
//! with opaque alpha. Encoding flattens alpha over the background color
//! and honors the quality setting.

use std::io::BufReader;

use pixmill_core::Bitmap;
use tracing::debug;

use crate::options::flatten_rgb;
use crate::{EncodeOptions, IoError, IoResult};

/// Decodes JPEG bytes into an opaque RGBA bitmap.
pub fn decode(bytes: &[u8]) -> IoResult<Bitmap> {
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(bytes));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let rgba: Vec<u8> = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        // Big-endian samples; keep the high byte
        jpeg_decoder::PixelFormat::L16 => pixels
            .chunks_exact(2)
            .flat_map(|l16| [l16[0], l16[0], l16[0], 255])
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks_exact(4)
            .flat_map(|cmyk| {
                let k = 1.0 - cmyk[3] as f32 / 255.0;
                let channel = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0).round() as u8;
                [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2]), 255]
            })
            .collect(),
    };

    debug!(width = info.width, height = info.height, format = ?info.pixel_format, "jpeg decode");
    Bitmap::from_raw(info.width as u32, info.height as u32, rgba)
        .map_err(|e| IoError::DecodeError(e.to_string()))
}

/// Encodes a bitmap as baseline JPEG at `options.quality`.
pub fn encode(bitmap: &Bitmap, options: &EncodeOptions) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    options.validate()?;
    let (width, height) = bitmap.dimensions();
    if bitmap.is_empty() || width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(IoError::EncodeError(format!(
            "JPEG cannot hold a {width}x{height} image"
        )));
    }

    let rgb = flatten_rgb(bitmap, options.background);
    // The encoder rejects quality 0
    let quality = options.quality.max(1);

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, quality);
    encoder
        .encode(&rgb, width as u16, height as u16, ColorType::Rgb)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

    debug!(width, height, quality, bytes = buffer.len(), "jpeg encode");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_color_survives() {
        let src = Bitmap::filled(16, 16, 0x4080C0FF);
        let bytes = encode(&src, &EncodeOptions::default()).unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);

        let back = decode(&bytes).unwrap();
        assert_eq!(back.dimensions(), (16, 16));
        for (a, b) in src.data().iter().zip(back.data()) {
            assert!((*a as i32 - *b as i32).abs() <= 3, "{a} vs {b}");
        }
    }

    #[test]
    fn test_transparent_takes_background() {
        let src = Bitmap::new(8, 8);
        let opts = EncodeOptions::default().with_background(0xFFFFFFFF);
        let back = decode(&encode(&src, &opts).unwrap()).unwrap();
        assert!(back.data().chunks(4).all(|px| px[0] >= 250 && px[3] == 255));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(decode(&[0xFF, 0xD8, 0xFF, 0x00]).is_err());
    }
}
