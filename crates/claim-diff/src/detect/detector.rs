//! [`ChangeDetector`] and its result types.

use serde::Serialize;
use thiserror::Error;

use super::config::DetectionConfig;
use super::finding::{Finding, FindingKind};
use crate::api::ConfigError;
use crate::classify::{classify_all, ClassMap};
use crate::palette::Palette;
use crate::raster::{BoolMask, RgbImage};
use crate::region::{label_components, Component};

/// The two frames cannot be compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("image dimensions differ: current (w, h) = {current:?}, previous (w, h) = {previous:?}")]
    DimensionMismatch {
        /// `(width, height)` of the current frame
        current: (usize, usize),
        /// `(width, height)` of the previous frame
        previous: (usize, usize),
    },
}

/// Pixel counts of one palette color in both frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStats {
    pub color: String,
    pub previous_count: usize,
    pub current_count: usize,
    /// `previous_count - current_count`; positive means pixels vanished.
    pub delta: i64,
    /// Drop as a percentage of `previous_count`. Absent when the color was
    /// not present before.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_decrease: Option<f64>,
    /// Whether this color passed the disappearance threshold.
    pub flagged: bool,
}

/// Classification masks of one palette color in both frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMasks {
    pub color: String,
    pub previous: BoolMask,
    pub current: BoolMask,
}

/// Intermediate data kept when [`DetectionConfig::debug`] is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugArtifacts {
    /// Per-color masks, in palette order.
    pub color_masks: Vec<ColorMasks>,
    /// Generic mode only: the thresholded difference mask.
    pub difference: Option<BoolMask>,
}

/// Output of [`ChangeDetector::detect`].
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub findings: Vec<Finding>,
    /// Pixel-count mode only, in palette order.
    pub color_stats: Vec<ColorStats>,
    pub debug: Option<DebugArtifacts>,
}

/// Compares two frames of the same map.
///
/// # Example
///
/// ```
/// use claim_diff::{ChangeDetector, ColorSpec, DetectionConfig, Palette, Rgb, RgbImage};
///
/// let palette = Palette::new(vec![ColorSpec::new("red", Rgb::new(163, 9, 7), 30)]).unwrap();
/// let config = DetectionConfig::default().min_area(1).use_pixel_count_mode(true);
/// let detector = ChangeDetector::new(palette, config).unwrap();
///
/// let background = Rgb::new(200, 200, 200);
/// let previous = RgbImage::from_fn(4, 4, |r, c| {
///     if r < 2 && c < 2 { Rgb::new(163, 9, 7) } else { background }
/// });
/// let current = RgbImage::new(4, 4, background);
///
/// let detection = detector.detect(&current, &previous).unwrap();
/// assert_eq!(detection.findings.len(), 1);
/// assert_eq!(detection.findings[0].pixel_count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    palette: Palette,
    config: DetectionConfig,
}

impl ChangeDetector {
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found by
    /// [`DetectionConfig::validate`].
    pub fn new(palette: Palette, config: DetectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { palette, config })
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Compare `current` against `previous`.
    ///
    /// # Errors
    ///
    /// [`DetectError::DimensionMismatch`] if the frames differ in width or
    /// height. Images are never resized or truncated.
    pub fn detect(&self, current: &RgbImage, previous: &RgbImage) -> Result<Detection, DetectError> {
        if !current.same_dimensions(previous) {
            return Err(DetectError::DimensionMismatch {
                current: current.dimensions(),
                previous: previous.dimensions(),
            });
        }

        let prev_classes = classify_all(previous, &self.palette);
        let cur_classes = classify_all(current, &self.palette);

        let mut detection = if self.config.use_pixel_count_mode {
            self.detect_pixel_count(&cur_classes, &prev_classes)
        } else {
            self.detect_generic(current, previous, &cur_classes, &prev_classes)
        };

        if let Some(debug) = detection.debug.as_mut() {
            debug.color_masks = self
                .palette
                .iter()
                .enumerate()
                .map(|(i, spec)| ColorMasks {
                    color: spec.name.clone(),
                    previous: prev_classes.mask(i),
                    current: cur_classes.mask(i),
                })
                .collect();
        }

        Ok(detection)
    }

    fn detect_generic(
        &self,
        current: &RgbImage,
        previous: &RgbImage,
        cur_classes: &ClassMap,
        prev_classes: &ClassMap,
    ) -> Detection {
        let threshold = self.config.pixel_diff_threshold;
        let focus = self.config.focus_on_claim_colors;
        let (cur_px, prev_px) = (current.pixels(), previous.pixels());

        let difference = BoolMask::from_fn(current.width(), current.height(), |i| {
            let differs = cur_px[i].channel_distance(prev_px[i]) > threshold;
            differs && (!focus || prev_classes.is_classified(i) || cur_classes.is_classified(i))
        });

        let findings = label_components(&difference)
            .iter()
            .filter(|c| c.len() >= self.config.min_area)
            .map(|component| {
                let before = dominant_class(component, prev_classes);
                let after = dominant_class(component, cur_classes);
                let (kind, color) = match (before, after) {
                    (Some(a), None) => (FindingKind::Disappeared, Some(a)),
                    (None, Some(b)) => (FindingKind::Appeared, Some(b)),
                    (Some(a), Some(b)) if a != b => (FindingKind::Disappeared, Some(a)),
                    (same, _) => (FindingKind::Changed, same),
                };
                let color = color.and_then(|i| self.palette.get(i)).cloned();
                Finding::from_component(component, kind, color)
            })
            .collect();

        Detection {
            findings,
            color_stats: Vec::new(),
            debug: self.config.debug.then(|| DebugArtifacts {
                color_masks: Vec::new(),
                difference: Some(difference),
            }),
        }
    }

    fn detect_pixel_count(&self, cur_classes: &ClassMap, prev_classes: &ClassMap) -> Detection {
        let prev_counts = prev_classes.counts();
        let cur_counts = cur_classes.counts();

        let mut findings = Vec::new();
        let mut color_stats = Vec::with_capacity(self.palette.len());

        for (i, spec) in self.palette.iter().enumerate() {
            let previous_count = prev_counts[i];
            let current_count = cur_counts[i];
            let delta = previous_count as i64 - current_count as i64;
            let percent_decrease =
                (previous_count > 0).then(|| delta as f64 * 100.0 / previous_count as f64);

            // Cross-multiplied so a drop exactly at the threshold still counts.
            let reaches_threshold = previous_count > 0
                && (delta * 100) as f64 >= self.config.percent_threshold * previous_count as f64;

            let flagged = delta > 0 && (self.config.detect_any_change || reaches_threshold);

            if flagged {
                let vanished = prev_classes.mask(i).and_not(&cur_classes.mask(i));
                findings.extend(
                    label_components(&vanished)
                        .iter()
                        .filter(|c| c.len() >= self.config.min_area)
                        .map(|c| Finding::from_component(c, FindingKind::Disappeared, Some(spec.clone()))),
                );
            }

            color_stats.push(ColorStats {
                color: spec.name.clone(),
                previous_count,
                current_count,
                delta,
                percent_decrease,
                flagged,
            });
        }

        Detection {
            findings,
            color_stats,
            debug: self.config.debug.then(DebugArtifacts::default),
        }
    }
}

/// Palette class held by a strict majority of the component's pixels.
fn dominant_class(component: &Component, classes: &ClassMap) -> Option<usize> {
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for &idx in component.indices() {
        if let Some(class) = classes.class_at(idx) {
            match tally.iter_mut().find(|(c, _)| *c == class) {
                Some((_, n)) => *n += 1,
                None => tally.push((class, 1)),
            }
        }
    }
    tally
        .into_iter()
        .find(|&(_, n)| n * 2 > component.len())
        .map(|(class, _)| class)
}
