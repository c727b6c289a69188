//! [`ClaimComparer`]: reusable comparison pipeline.

use crate::color::Rgb;
use crate::detect::{ChangeDetector, DetectionConfig};
use crate::output::Visualizer;
use crate::palette::Palette;
use crate::preprocess::{CropError, Posterizer, RegionCropper};
use crate::raster::RgbImage;

use super::compare::{run, Comparison};
use super::error::{ClaimDiffError, ConfigError};

/// Palette, detection settings and preprocessing in one value.
///
/// Configuration methods consume and return `self`; the comparison methods
/// take `&self`, so one comparer serves any number of frame pairs. Both
/// frames given to [`compare`](Self::compare) should already have been run
/// through [`preprocess`](Self::preprocess) with the same comparer.
///
/// # Example
///
/// ```
/// use claim_diff::{ClaimComparer, DetectionConfig, Palette, Rgb, RgbImage};
///
/// let comparer = ClaimComparer::new(Palette::reference())
///     .config(DetectionConfig::default().min_area(1).use_pixel_count_mode(true))
///     .posterize(16)
///     .unwrap();
///
/// let previous = RgbImage::new(4, 4, Rgb::new(163, 9, 7));
/// let current = RgbImage::new(4, 4, Rgb::new(200, 200, 200));
/// let result = comparer
///     .compare(&comparer.posterize_only(&current), &comparer.posterize_only(&previous))
///     .unwrap();
/// assert_eq!(result.findings.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ClaimComparer {
    palette: Palette,
    config: DetectionConfig,
    cropper: Option<RegionCropper>,
    posterizer: Option<Posterizer>,
    visualizer: Visualizer,
}

impl ClaimComparer {
    /// Comparer with default detection settings and no preprocessing.
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            config: DetectionConfig::default(),
            cropper: None,
            posterizer: None,
            visualizer: Visualizer::default(),
        }
    }

    pub fn config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Crop both frames to their marker border before comparing.
    pub fn crop(mut self, cropper: RegionCropper) -> Self {
        self.cropper = Some(cropper);
        self
    }

    /// Posterize both frames to `levels` per channel.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PosterizeLevels`] unless `2 <= levels <= 256`.
    pub fn posterize(mut self, levels: u16) -> Result<Self, ConfigError> {
        self.posterizer = Some(Posterizer::new(levels)?);
        Ok(self)
    }

    pub fn highlight(mut self, color: Rgb) -> Self {
        self.visualizer = Visualizer::new(color);
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn detection_config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn cropper(&self) -> Option<&RegionCropper> {
        self.cropper.as_ref()
    }

    pub fn posterizer(&self) -> Option<&Posterizer> {
        self.posterizer.as_ref()
    }

    /// Crop (if configured) then posterize (if configured).
    ///
    /// # Errors
    ///
    /// [`CropError::NoBorderFound`] if cropping is enabled and the border
    /// is missing.
    pub fn preprocess(&self, image: &RgbImage) -> Result<RgbImage, CropError> {
        let cropped = match &self.cropper {
            Some(cropper) => cropper.crop(image)?,
            None => image.clone(),
        };
        Ok(self.posterize_only(&cropped))
    }

    /// Like [`preprocess`](Self::preprocess), but on a missing border the
    /// uncropped image is posterized and returned together with the error
    /// that was recovered from.
    pub fn preprocess_or_uncropped(&self, image: &RgbImage) -> (RgbImage, Option<CropError>) {
        match self.preprocess(image) {
            Ok(prepared) => (prepared, None),
            Err(err) => (self.posterize_only(image), Some(err)),
        }
    }

    /// Apply only the posterize step.
    pub fn posterize_only(&self, image: &RgbImage) -> RgbImage {
        match &self.posterizer {
            Some(posterizer) => posterizer.apply(image),
            None => image.clone(),
        }
    }

    /// Compare two preprocessed frames.
    ///
    /// # Errors
    ///
    /// - [`ClaimDiffError::Config`] if the detection settings are out of range
    /// - [`ClaimDiffError::Detect`] if the frames differ in size
    pub fn compare(&self, current: &RgbImage, previous: &RgbImage) -> Result<Comparison, ClaimDiffError> {
        let detector = ChangeDetector::new(self.palette.clone(), self.config.clone())?;
        run(&detector, &self.visualizer, current, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::ColorSpec;

    const BG: Rgb = Rgb::new(200, 200, 200);

    fn framed(inner: Rgb) -> RgbImage {
        RgbImage::from_fn(8, 8, |r, c| {
            if r == 0 || r == 7 || c == 0 || c == 7 {
                Rgb::new(255, 0, 0)
            } else {
                inner
            }
        })
    }

    #[test]
    fn test_preprocess_crops_then_posterizes() {
        let comparer = ClaimComparer::new(Palette::reference())
            .crop(RegionCropper::default())
            .posterize(2)
            .unwrap();
        let prepared = comparer.preprocess(&framed(Rgb::new(100, 140, 10))).unwrap();
        assert_eq!(prepared.dimensions(), (6, 6));
        assert!(prepared.pixels().iter().all(|&p| p == Rgb::new(0, 255, 0)));
    }

    #[test]
    fn test_preprocess_or_uncropped_reports_fallback() {
        let comparer = ClaimComparer::new(Palette::reference()).crop(RegionCropper::default());
        let plain = RgbImage::new(5, 5, BG);

        assert!(comparer.preprocess(&plain).is_err());
        let (image, recovered) = comparer.preprocess_or_uncropped(&plain);
        assert_eq!(image, plain);
        assert!(matches!(recovered, Some(CropError::NoBorderFound { .. })));

        let (_, recovered) = comparer.preprocess_or_uncropped(&framed(BG));
        assert!(recovered.is_none());
    }

    #[test]
    fn test_invalid_levels() {
        assert!(matches!(
            ClaimComparer::new(Palette::reference()).posterize(1),
            Err(ConfigError::PosterizeLevels(1))
        ));
    }

    #[test]
    fn test_custom_highlight() {
        let red = Rgb::new(163, 9, 7);
        let palette = Palette::new(vec![ColorSpec::new("red", red, 30)]).unwrap();
        let comparer = ClaimComparer::new(palette)
            .config(DetectionConfig::default().min_area(1))
            .highlight(Rgb::new(0, 255, 255));
        let result = comparer
            .compare(&RgbImage::new(2, 2, BG), &RgbImage::new(2, 2, red))
            .unwrap();
        assert!(result
            .visualization
            .pixels()
            .iter()
            .all(|&p| p == Rgb::new(0, 255, 255)));
    }

    #[test]
    fn test_invalid_config_surfaces_on_compare() {
        let comparer = ClaimComparer::new(Palette::reference())
            .config(DetectionConfig::default().percent_threshold(f64::INFINITY));
        let frame = RgbImage::new(2, 2, BG);
        assert!(matches!(
            comparer.compare(&frame, &frame),
            Err(ClaimDiffError::Config(_))
        ));
    }
}
