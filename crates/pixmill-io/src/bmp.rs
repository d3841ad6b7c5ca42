//! BMP format support.
//!
//! Reads uncompressed Windows bitmaps (8-bit paletted, 24-bit and 32-bit,
//! bottom-up or top-down, `BI_RGB` or `BI_BITFIELDS`). Writes 32-bit BGRA
//! when alpha is kept, otherwise 24-bit BGR flattened over the background.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use pixmill_core::Bitmap;
use tracing::debug;

use crate::options::flatten_rgb;
use crate::{EncodeOptions, IoError, IoResult};

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;
/// 72 DPI in pixels per meter.
const PIXELS_PER_METER: i32 = 2835;

/// Parsed header fields the decoder needs.
#[derive(Debug)]
struct Header {
    pixel_offset: u32,
    header_size: u32,
    width: u32,
    height: u32,
    top_down: bool,
    bpp: u16,
    compression: u32,
    colors_used: u32,
}

impl Header {
    fn read<R: Read>(reader: &mut R) -> IoResult<Self> {
        let mut magic = [0u8; 2];
        reader.read_exact(&mut magic)?;
        if &magic != b"BM" {
            return Err(IoError::DecodeError("missing BM signature".into()));
        }
        let _file_size = reader.read_u32::<LittleEndian>()?;
        let _reserved = reader.read_u32::<LittleEndian>()?;
        let pixel_offset = reader.read_u32::<LittleEndian>()?;

        let header_size = reader.read_u32::<LittleEndian>()?;
        if header_size < INFO_HEADER_SIZE {
            return Err(IoError::DecodeError(format!(
                "unsupported DIB header of {header_size} bytes"
            )));
        }
        let width = reader.read_i32::<LittleEndian>()?;
        let height = reader.read_i32::<LittleEndian>()?;
        let _planes = reader.read_u16::<LittleEndian>()?;
        let bpp = reader.read_u16::<LittleEndian>()?;
        let compression = reader.read_u32::<LittleEndian>()?;
        let _image_size = reader.read_u32::<LittleEndian>()?;
        let _x_ppm = reader.read_i32::<LittleEndian>()?;
        let _y_ppm = reader.read_i32::<LittleEndian>()?;
        let colors_used = reader.read_u32::<LittleEndian>()?;
        let _important = reader.read_u32::<LittleEndian>()?;

        if width <= 0 || height == 0 {
            return Err(IoError::DecodeError(format!("bad dimensions {width}x{height}")));
        }

        Ok(Self {
            pixel_offset,
            header_size,
            width: width as u32,
            height: height.unsigned_abs(),
            top_down: height < 0,
            bpp,
            compression,
            colors_used,
        })
    }

    fn row_stride(&self) -> usize {
        (self.width as usize * self.bpp as usize).div_ceil(32) * 4
    }
}

/// Channel masks for 32-bit images, in R, G, B, A order.
fn read_masks<R: Read + Seek>(reader: &mut R, header: &Header) -> IoResult<[u32; 4]> {
    if header.compression != BI_BITFIELDS {
        return Ok([0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000]);
    }
    reader.seek(SeekFrom::Start((FILE_HEADER_SIZE + INFO_HEADER_SIZE) as u64))?;
    let r = reader.read_u32::<LittleEndian>()?;
    let g = reader.read_u32::<LittleEndian>()?;
    let b = reader.read_u32::<LittleEndian>()?;
    // V4+ headers carry an alpha mask after the color masks
    let a = if header.header_size >= 56 {
        reader.read_u32::<LittleEndian>()?
    } else {
        0
    };
    Ok([r, g, b, a])
}

fn read_palette<R: Read + Seek>(reader: &mut R, header: &Header) -> IoResult<Vec<[u8; 3]>> {
    let count = match header.colors_used {
        0 => 256,
        n => n.min(256),
    };
    reader.seek(SeekFrom::Start((FILE_HEADER_SIZE + header.header_size) as u64))?;
    let mut palette = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut bgrx = [0u8; 4];
        reader.read_exact(&mut bgrx)?;
        palette.push([bgrx[2], bgrx[1], bgrx[0]]);
    }
    Ok(palette)
}

/// Extracts a masked channel scaled to 8 bits.
fn channel(value: u32, mask: u32) -> Option<u8> {
    if mask == 0 {
        return None;
    }
    let shift = mask.trailing_zeros();
    let max = (mask >> shift) as u64;
    let v = ((value & mask) >> shift) as u64;
    Some(((v * 255 + max / 2) / max) as u8)
}

/// Decodes BMP bytes into an RGBA bitmap.
pub fn decode(bytes: &[u8]) -> IoResult<Bitmap> {
    let mut reader = Cursor::new(bytes);
    let header = Header::read(&mut reader)?;

    match (header.bpp, header.compression) {
        (8, BI_RGB) | (24, BI_RGB) | (32, BI_RGB) | (32, BI_BITFIELDS) => {}
        (bpp, compression) => {
            return Err(IoError::DecodeError(format!(
                "unsupported BMP variant: {bpp} bpp, compression {compression}"
            )));
        }
    }

    let palette = if header.bpp == 8 {
        read_palette(&mut reader, &header)?
    } else {
        Vec::new()
    };
    let masks = read_masks(&mut reader, &header)?;

    let stride = header.row_stride();
    let (width, height) = (header.width as usize, header.height as usize);
    let start = header.pixel_offset as usize;
    let end = stride
        .checked_mul(height)
        .and_then(|n| n.checked_add(start))
        .ok_or_else(|| IoError::DecodeError("pixel array overflows".into()))?;
    let pixels = bytes
        .get(start..end)
        .ok_or_else(|| IoError::DecodeError("truncated pixel array".into()))?;

    let mut rgba = vec![0u8; width * height * 4];
    let mut any_alpha = false;
    for (row_index, row) in pixels.chunks_exact(stride).enumerate() {
        let y = if header.top_down { row_index } else { height - 1 - row_index };
        let out = &mut rgba[y * width * 4..(y + 1) * width * 4];
        for (x, px) in out.chunks_exact_mut(4).enumerate() {
            match header.bpp {
                8 => {
                    let [r, g, b] = palette
                        .get(row[x] as usize)
                        .copied()
                        .ok_or_else(|| IoError::DecodeError("palette index out of range".into()))?;
                    px.copy_from_slice(&[r, g, b, 255]);
                }
                24 => {
                    let s = &row[x * 3..x * 3 + 3];
                    px.copy_from_slice(&[s[2], s[1], s[0], 255]);
                }
                _ => {
                    let mut s = &row[x * 4..x * 4 + 4];
                    let value = s.read_u32::<LittleEndian>()?;
                    let a = channel(value, masks[3]);
                    any_alpha |= a.is_some_and(|a| a != 0);
                    px.copy_from_slice(&[
                        channel(value, masks[0]).unwrap_or(0),
                        channel(value, masks[1]).unwrap_or(0),
                        channel(value, masks[2]).unwrap_or(0),
                        a.unwrap_or(255),
                    ]);
                }
            }
        }
    }

    // Writers that leave the fourth byte zeroed mean "opaque"
    if header.bpp == 32 && !any_alpha {
        rgba.chunks_exact_mut(4).for_each(|px| px[3] = 255);
    }

    debug!(width, height, bpp = header.bpp, "bmp decode");
    Bitmap::from_raw(header.width, header.height, rgba)
        .map_err(|e| IoError::DecodeError(e.to_string()))
}

/// Encodes a bitmap as an uncompressed bottom-up BMP.
pub fn encode(bitmap: &Bitmap, options: &EncodeOptions) -> IoResult<Vec<u8>> {
    options.validate()?;
    let (width, height) = bitmap.dimensions();
    if bitmap.is_empty() || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(IoError::EncodeError(format!(
            "BMP cannot hold a {width}x{height} image"
        )));
    }

    let bpp: u16 = if options.use_alpha { 32 } else { 24 };
    let stride = (width as usize * bpp as usize).div_ceil(32) * 4;
    let image_size = u32::try_from(stride * height as usize)
        .map_err(|_| IoError::EncodeError("image too large for BMP".into()))?;
    let pixel_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
    let file_size = pixel_offset
        .checked_add(image_size)
        .ok_or_else(|| IoError::EncodeError("image too large for BMP".into()))?;

    let mut out = Vec::with_capacity(file_size as usize);
    out.write_all(b"BM")?;
    out.write_u32::<LittleEndian>(file_size)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(pixel_offset)?;

    out.write_u32::<LittleEndian>(INFO_HEADER_SIZE)?;
    out.write_i32::<LittleEndian>(width as i32)?;
    out.write_i32::<LittleEndian>(height as i32)?;
    out.write_u16::<LittleEndian>(1)?;
    out.write_u16::<LittleEndian>(bpp)?;
    out.write_u32::<LittleEndian>(BI_RGB)?;
    out.write_u32::<LittleEndian>(image_size)?;
    out.write_i32::<LittleEndian>(PIXELS_PER_METER)?;
    out.write_i32::<LittleEndian>(PIXELS_PER_METER)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(0)?;

    let flat = if options.use_alpha {
        Vec::new()
    } else {
        flatten_rgb(bitmap, options.background)
    };
    let row_bytes = width as usize * (bpp as usize / 8);
    let padding = stride - row_bytes;

    for y in (0..height as usize).rev() {
        if options.use_alpha {
            for px in bitmap.row(y as u32).chunks_exact(4) {
                out.write_all(&[px[2], px[1], px[0], px[3]])?;
            }
        } else {
            let row = &flat[y * width as usize * 3..(y + 1) * width as usize * 3];
            for px in row.chunks_exact(3) {
                out.write_all(&[px[2], px[1], px[0]])?;
            }
        }
        out.write_all(&[0u8; 3][..padding])?;
    }

    debug!(width, height, bpp, bytes = out.len(), "bmp encode");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(w: u32, h: u32) -> Bitmap {
        let mut bitmap = Bitmap::new(w, h);
        bitmap.for_each_pixel_mut(|x, y, px| {
            px.copy_from_slice(&[(x * 40) as u8, (y * 50) as u8, 200, 100 + x as u8]);
        });
        bitmap
    }

    #[test]
    fn test_32bit_keeps_alpha() {
        let src = pattern(5, 3);
        let bytes = encode(&src, &EncodeOptions::default()).unwrap();
        assert_eq!(&bytes[..2], b"BM");
        assert_eq!(decode(&bytes).unwrap(), src);
    }

    #[test]
    fn test_24bit_row_padding() {
        // 5 px * 3 bytes = 15, padded to 16
        let src = Bitmap::filled(5, 2, 0x102030FF);
        let bytes = encode(&src, &EncodeOptions::default().with_alpha(false)).unwrap();
        assert_eq!(bytes.len(), 54 + 16 * 2);
        assert_eq!(decode(&bytes).unwrap(), src);
    }

    #[test]
    fn test_zero_alpha_bytes_mean_opaque() {
        let mut bytes = encode(&Bitmap::filled(2, 2, 0x0A0B0CFF), &EncodeOptions::default()).unwrap();
        for i in 0..4 {
            bytes[54 + i * 4 + 3] = 0;
        }
        let back = decode(&bytes).unwrap();
        assert_eq!(back.get_pixel_color(1, 1).unwrap(), 0x0A0B0CFF);
    }

    #[test]
    fn test_truncated() {
        let bytes = encode(&pattern(4, 4), &EncodeOptions::default()).unwrap();
        assert!(decode(&bytes[..bytes.len() - 1]).is_err());
        assert!(decode(b"BM").is_err());
    }

    #[test]
    fn test_channel_scaling() {
        assert_eq!(channel(0x1F, 0x1F), Some(255));
        assert_eq!(channel(0, 0xF800), Some(0));
        assert_eq!(channel(123, 0), None);
    }
}
