//! Detection parameters.

use serde::{Deserialize, Serialize};

use crate::api::ConfigError;

/// Parameters for one comparison.
///
/// Every field has a default, so partial YAML or JSON documents
/// deserialize cleanly. Builder-style setters mirror the fields.
///
/// # Example
///
/// ```
/// use claim_diff::DetectionConfig;
///
/// let config = DetectionConfig::default()
///     .min_area(1)
///     .percent_threshold(10.0)
///     .use_pixel_count_mode(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Components smaller than this many pixels are discarded.
    pub min_area: usize,
    /// Generic mode: a pixel differs when its largest per-channel
    /// difference exceeds this value.
    pub pixel_diff_threshold: u8,
    /// Tolerance given to palette entries that do not set their own.
    pub color_tolerance: u8,
    /// Pixel-count mode: minimum percentage drop of a color's pixel count.
    pub percent_threshold: f64,
    /// Pixel-count mode: flag any drop, ignoring `percent_threshold`.
    pub detect_any_change: bool,
    /// Generic mode: ignore pixels that match no palette color in either
    /// frame.
    pub focus_on_claim_colors: bool,
    pub use_pixel_count_mode: bool,
    /// Keep per-color masks and counts in the result.
    pub debug: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_area: 20,
            pixel_diff_threshold: 50,
            color_tolerance: 30,
            percent_threshold: 1.0,
            detect_any_change: false,
            focus_on_claim_colors: false,
            use_pixel_count_mode: false,
            debug: false,
        }
    }
}

impl DetectionConfig {
    /// Reject out-of-range values.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PercentThreshold`] if `percent_threshold` is not a
    /// finite value in `[0, 100]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.percent_threshold.is_finite() || !(0.0..=100.0).contains(&self.percent_threshold) {
            return Err(ConfigError::PercentThreshold(self.percent_threshold));
        }
        Ok(())
    }

    pub fn min_area(mut self, min_area: usize) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn pixel_diff_threshold(mut self, threshold: u8) -> Self {
        self.pixel_diff_threshold = threshold;
        self
    }

    pub fn color_tolerance(mut self, tolerance: u8) -> Self {
        self.color_tolerance = tolerance;
        self
    }

    pub fn percent_threshold(mut self, percent: f64) -> Self {
        self.percent_threshold = percent;
        self
    }

    pub fn detect_any_change(mut self, enabled: bool) -> Self {
        self.detect_any_change = enabled;
        self
    }

    pub fn focus_on_claim_colors(mut self, enabled: bool) -> Self {
        self.focus_on_claim_colors = enabled;
        self
    }

    pub fn use_pixel_count_mode(mut self, enabled: bool) -> Self {
        self.use_pixel_count_mode = enabled;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}
