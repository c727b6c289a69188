//! [`RgbImage`]: an owned width x height grid of [`Rgb`] pixels.

use thiserror::Error;

use crate::color::Rgb;

/// Errors building an image from a raw byte buffer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    #[error("pixel buffer has {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// An RGB image in row-major order.
///
/// Two images are *comparable* only if their width and height are equal;
/// see [`RgbImage::same_dimensions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl RgbImage {
    /// Create an image with every pixel set to `fill`.
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    /// Build an image by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                pixels.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap already-built pixels.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self, RasterError> {
        if pixels.len() != width * height {
            return Err(RasterError::BufferSize {
                width,
                height,
                expected: width * height * 3,
                actual: pixels.len() * 3,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image from packed `[R, G, B, R, G, B, ...]` bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, RasterError> {
        Self::from_packed(width, height, bytes, 3)
    }

    /// Build an image from packed RGBA bytes. Alpha is ignored.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, RasterError> {
        Self::from_packed(width, height, bytes, 4)
    }

    fn from_packed(
        width: usize,
        height: usize,
        bytes: &[u8],
        channels: usize,
    ) -> Result<Self, RasterError> {
        let expected = width * height * channels;
        if bytes.len() != expected {
            return Err(RasterError::BufferSize {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(channels)
            .map(|px| Rgb::new(px[0], px[1], px[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// True if `other` has the same width and height.
    #[inline]
    pub fn same_dimensions(&self, other: &RgbImage) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Pixel at `(row, col)`, or `None` outside the image.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Rgb> {
        if row < self.height && col < self.width {
            Some(self.pixels[row * self.width + col])
        } else {
            None
        }
    }

    /// Set the pixel at `(row, col)`. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, color: Rgb) {
        if row < self.height && col < self.width {
            self.pixels[row * self.width + col] = color;
        }
    }

    /// Pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Copy out the rectangle `rows x cols` (half-open ranges).
    ///
    /// Ranges are clamped to the image bounds.
    pub fn sub_image(&self, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) -> Self {
        let row_end = rows.end.min(self.height);
        let col_end = cols.end.min(self.width);
        let row_start = rows.start.min(row_end);
        let col_start = cols.start.min(col_end);

        let mut pixels = Vec::with_capacity((row_end - row_start) * (col_end - col_start));
        for row in row_start..row_end {
            let base = row * self.width;
            pixels.extend_from_slice(&self.pixels[base + col_start..base + col_end]);
        }
        Self {
            width: col_end - col_start,
            height: row_end - row_start,
            pixels,
        }
    }

    /// Packed `[R, G, B, ...]` bytes, row-major.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            bytes.extend_from_slice(&px.to_bytes());
        }
        bytes
    }
}
