use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{WmfError, WmfResult};

const FILE_HEADER_BYTES: usize = 14;
const CORE_HEADER_BYTES: u32 = 12;
const INFO_HEADER_BYTES: u32 = 40;
const BI_BITFIELDS: u32 = 3;
const BI_ALPHABITFIELDS: u32 = 6;

/// A decoded raster image in premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedBitmap {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Turns embedded bitmap bytes into a [`DecodedBitmap`].
pub trait BitmapDecoder: Send + Sync {
    /// Decode a packed DIB (BITMAPINFO header, color table and pixels, no file header).
    fn decode_dib(&self, dib: &[u8]) -> WmfResult<DecodedBitmap>;
}

/// Default decoder: prefixes a BITMAPFILEHEADER and hands the result to `image`'s BMP codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct DibDecoder;

impl BitmapDecoder for DibDecoder {
    fn decode_dib(&self, dib: &[u8]) -> WmfResult<DecodedBitmap> {
        let bmp = dib_to_bmp_file(dib)?;
        let dyn_img = image::load_from_memory_with_format(&bmp, image::ImageFormat::Bmp)
            .context("decode DIB as BMP")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Ok(DecodedBitmap {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }
}

/// Wrap a packed DIB in a BMP file header so generic decoders accept it.
pub fn dib_to_bmp_file(dib: &[u8]) -> WmfResult<Vec<u8>> {
    let header_size = read_u32(dib, 0).ok_or_else(|| bad_dib("missing header size"))?;
    let pixel_offset = if header_size == CORE_HEADER_BYTES {
        let bit_count = read_u16(dib, 10).ok_or_else(|| bad_dib("core header is truncated"))?;
        let colors = if bit_count <= 8 { 1usize << bit_count } else { 0 };
        CORE_HEADER_BYTES as usize + colors * 3
    } else if header_size >= INFO_HEADER_BYTES {
        let bit_count = read_u16(dib, 14).ok_or_else(|| bad_dib("info header is truncated"))?;
        let compression = read_u32(dib, 16).ok_or_else(|| bad_dib("info header is truncated"))?;
        let clr_used = read_u32(dib, 32).ok_or_else(|| bad_dib("info header is truncated"))?;
        let colors = match clr_used {
            0 if bit_count <= 8 => 1usize << bit_count,
            n => n as usize,
        };
        let masks = match (header_size, compression) {
            (INFO_HEADER_BYTES, BI_BITFIELDS) => 12,
            (INFO_HEADER_BYTES, BI_ALPHABITFIELDS) => 16,
            _ => 0,
        };
        header_size as usize + masks + colors * 4
    } else {
        return Err(bad_dib(format!("unsupported header size {header_size}")));
    };

    if pixel_offset > dib.len() {
        return Err(bad_dib(format!(
            "pixel data offset {pixel_offset} past end of {} bytes",
            dib.len()
        )));
    }

    let file_size = u32::try_from(FILE_HEADER_BYTES + dib.len())
        .map_err(|_| bad_dib("bitmap larger than 4 GiB"))?;
    let mut out = Vec::with_capacity(FILE_HEADER_BYTES + dib.len());
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&((FILE_HEADER_BYTES + pixel_offset) as u32).to_le_bytes());
    out.extend_from_slice(dib);
    Ok(out)
}

/// Convert a device-dependent Bitmap16 payload (as carried by pattern-brush and legacy
/// blit records) to premultiplied RGBA8. Monochrome set bits are white.
pub fn bitmap16_to_rgba(
    width: u16,
    height: u16,
    width_bytes: u16,
    bits_pixel: u8,
    bits: &[u8],
) -> WmfResult<DecodedBitmap> {
    let (w, h, stride) = (
        usize::from(width),
        usize::from(height),
        usize::from(width_bytes),
    );
    if stride * h > bits.len() {
        return Err(bad_dib(format!(
            "bitmap16 needs {} bytes, has {}",
            stride * h,
            bits.len()
        )));
    }
    let mut out = Vec::with_capacity(w * h * 4);
    for row in bits.chunks(stride.max(1)).take(h) {
        for x in 0..w {
            let px = match bits_pixel {
                1 => {
                    let on = row.get(x / 8).is_some_and(|b| b & (0x80 >> (x % 8)) != 0);
                    if on { [255, 255, 255, 255] } else { [0, 0, 0, 255] }
                }
                24 | 32 => {
                    let step = usize::from(bits_pixel / 8);
                    match row.get(x * step..x * step + 3) {
                        Some(bgr) => [bgr[2], bgr[1], bgr[0], 255],
                        None => [0, 0, 0, 255],
                    }
                }
                other => return Err(bad_dib(format!("bitmap16 depth {other} not supported"))),
            };
            out.extend_from_slice(&px);
        }
    }
    Ok(DecodedBitmap {
        width: u32::from(width),
        height: u32::from(height),
        rgba8_premul: Arc::new(out),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn read_u16(b: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_le_bytes(b.get(at..at + 2)?.try_into().ok()?))
}

fn read_u32(b: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(b.get(at..at + 4)?.try_into().ok()?))
}

fn bad_dib(msg: impl Into<String>) -> WmfError {
    WmfError::Other(anyhow::anyhow!("invalid DIB: {}", msg.into()))
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/decode.rs"]
mod tests;
