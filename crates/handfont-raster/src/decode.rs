//! Raw bytes to single-channel intensity.

use image::{GrayImage, Luma};

use crate::RasterError;

/// Decode an encoded raster image into 8-bit intensity.
///
/// Transparent pixels are composited over white first, then the color is
/// reduced with BT.601 weights (`0.299 R + 0.587 G + 0.114 B`) in 14-bit
/// fixed point.
pub fn decode_luma(bytes: &[u8]) -> Result<GrayImage, RasterError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(RasterError::EmptyImage { width, height });
    }
    let rgba = img.to_rgba8();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Luma([bt601(over_white(r, a), over_white(g, a), over_white(b, a))])
    }))
}

#[inline]
fn over_white(c: u8, alpha: u8) -> u32 {
    let (c, a) = (c as u32, alpha as u32);
    (c * a + 255 * (255 - a) + 127) / 255
}

#[inline]
fn bt601(r: u32, g: u32, b: u32) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((r * R + g * G + b * B + (1 << 13)) >> 14).min(255) as u8
}
