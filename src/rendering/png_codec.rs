//! PNG decoding and encoding for screenshots, baselines and artifacts.
//!
//! Decoding normalizes every PNG flavor (palette, grayscale, 16-bit, with or
//! without alpha) to 8-bit RGB; alpha is dropped. Encoding always writes
//! 8-bit RGB or grayscale, so a decode of an encoded image returns the same
//! pixels.

use claim_diff::{BoolMask, Rgb, RgbImage};
use std::io::Cursor;

use crate::error::CodecError;

/// Largest accepted image, in pixels.
pub const MAX_PIXELS: usize = 64 * 1024 * 1024;

/// Decode a PNG into an RGB image.
pub fn decode_png(bytes: &[u8]) -> Result<RgbImage, CodecError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let (width, height) = {
        let info = reader.info();
        (info.width as usize, info.height as usize)
    };
    if width.saturating_mul(height) > MAX_PIXELS {
        return Err(CodecError::TooLarge { width, height });
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let data = &buf[..frame.buffer_size()];

    if frame.bit_depth != png::BitDepth::Eight {
        return Err(CodecError::Decode(format!(
            "unsupported bit depth after expansion: {:?}",
            frame.bit_depth
        )));
    }

    let image = match frame.color_type {
        png::ColorType::Rgb => RgbImage::from_rgb_bytes(width, height, data)?,
        png::ColorType::Rgba => RgbImage::from_rgba_bytes(width, height, data)?,
        png::ColorType::Grayscale => gray_to_rgb(width, height, data, 1)?,
        png::ColorType::GrayscaleAlpha => gray_to_rgb(width, height, data, 2)?,
        png::ColorType::Indexed => {
            return Err(CodecError::Decode(
                "indexed color was not expanded".to_string(),
            ))
        }
    };

    Ok(image)
}

fn gray_to_rgb(
    width: usize,
    height: usize,
    data: &[u8],
    channels: usize,
) -> Result<RgbImage, CodecError> {
    let pixels: Vec<Rgb> = data
        .chunks_exact(channels)
        .map(|px| Rgb::new(px[0], px[0], px[0]))
        .collect();
    Ok(RgbImage::from_pixels(width, height, pixels)?)
}

/// Encode an image as 8-bit RGB PNG.
pub fn encode_rgb_png(image: &RgbImage) -> Result<Vec<u8>, CodecError> {
    encode(
        image.width(),
        image.height(),
        png::ColorType::Rgb,
        &image.to_rgb_bytes(),
    )
}

/// Encode a mask as 8-bit grayscale PNG, white for set pixels.
pub fn encode_mask_png(mask: &BoolMask) -> Result<Vec<u8>, CodecError> {
    encode(
        mask.width(),
        mask.height(),
        png::ColorType::Grayscale,
        &mask.to_gray_bytes(),
    )
}

fn encode(
    width: usize,
    height: usize,
    color_type: png::ColorType,
    data: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let too_large = || CodecError::TooLarge { width, height };
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, w, h);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Re-compress a PNG with oxipng. Returns the input on failure.
pub fn optimize_png(png_bytes: Vec<u8>) -> Vec<u8> {
    oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            optimize_alpha: false,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbImage {
        RgbImage::from_fn(7, 5, |r, c| Rgb::new(r as u8 * 40, c as u8 * 30, 163))
    }

    fn raw_png(width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn test_encode_decode_is_lossless() {
        let image = sample();
        let png = encode_rgb_png(&image).unwrap();
        assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(decode_png(&png).unwrap(), image);
    }

    #[test]
    fn test_optimized_png_is_lossless() {
        let image = sample();
        let optimized = optimize_png(encode_rgb_png(&image).unwrap());
        assert_eq!(decode_png(&optimized).unwrap(), image);
    }

    #[test]
    fn test_decode_rgba_drops_alpha() {
        let png = raw_png(2, 1, png::ColorType::Rgba, png::BitDepth::Eight, &[1, 2, 3, 0, 4, 5, 6, 255]);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.pixels(), &[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]);
    }

    #[test]
    fn test_decode_grayscale() {
        let png = raw_png(3, 1, png::ColorType::Grayscale, png::BitDepth::Eight, &[0, 128, 255]);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.get(0, 1), Some(Rgb::new(128, 128, 128)));
    }

    #[test]
    fn test_decode_16_bit_strips_to_8() {
        let png = raw_png(1, 1, png::ColorType::Rgb, png::BitDepth::Sixteen, &[0xAB, 0x01, 0x12, 0xFF, 0x00, 0x00]);
        let image = decode_png(&png).unwrap();
        assert_eq!(image.get(0, 0), Some(Rgb::new(0xAB, 0x12, 0x00)));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(decode_png(b"not a png"), Err(CodecError::Decode(_))));
        assert!(matches!(decode_png(&[]), Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_mask_png() {
        let mask = BoolMask::from_fn(2, 2, |i| i % 2 == 0);
        let image = decode_png(&encode_mask_png(&mask).unwrap()).unwrap();
        assert_eq!(image.get(0, 0), Some(Rgb::WHITE));
        assert_eq!(image.get(0, 1), Some(Rgb::BLACK));
    }
}
