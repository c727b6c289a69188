//! Channel quantization.

use crate::api::ConfigError;
use crate::color::Rgb;
use crate::raster::RgbImage;

/// Quantizes every channel to `levels` evenly spaced values in `[0, 255]`.
///
/// The mapping is precomputed into a 256-entry lookup table. It is
/// idempotent: posterizing an already posterized image with the same
/// level count returns it unchanged.
///
/// # Example
///
/// ```
/// use claim_diff::{Posterizer, Rgb};
///
/// let posterizer = Posterizer::new(2).unwrap();
/// assert_eq!(posterizer.apply_pixel(Rgb::new(100, 130, 255)), Rgb::new(0, 255, 255));
/// ```
#[derive(Debug, Clone)]
pub struct Posterizer {
    levels: u16,
    lut: [u8; 256],
}

impl Posterizer {
    /// Smallest accepted level count.
    pub const MIN_LEVELS: u16 = 2;
    /// Largest accepted level count (identity mapping).
    pub const MAX_LEVELS: u16 = 256;

    /// # Errors
    ///
    /// [`ConfigError::PosterizeLevels`] unless `2 <= levels <= 256`.
    pub fn new(levels: u16) -> Result<Self, ConfigError> {
        if !(Self::MIN_LEVELS..=Self::MAX_LEVELS).contains(&levels) {
            return Err(ConfigError::PosterizeLevels(levels));
        }

        let step = 255.0 / f32::from(levels - 1);
        let mut lut = [0u8; 256];
        for (value, slot) in lut.iter_mut().enumerate() {
            let bucket = (value as f32 / step).round();
            *slot = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }

        Ok(Self { levels, lut })
    }

    #[inline]
    pub fn levels(&self) -> u16 {
        self.levels
    }

    #[inline]
    pub fn apply_pixel(&self, pixel: Rgb) -> Rgb {
        pixel.map_channels(|c| self.lut[c as usize])
    }

    /// Posterize a copy of `image`.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let mut out = image.clone();
        self.apply_in_place(&mut out);
        out
    }

    pub fn apply_in_place(&self, image: &mut RgbImage) {
        for px in image.pixels_mut() {
            *px = self.apply_pixel(*px);
        }
    }
}
