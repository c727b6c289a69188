use crate::detect::{ChangeDetector, ColorStats, DebugArtifacts, DetectionConfig, Finding};
use crate::output::{Report, Visualizer};
use crate::palette::Palette;
use crate::raster::RgbImage;

use super::error::ClaimDiffError;

/// Result of comparing two frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub findings: Vec<Finding>,
    pub report: Report,
    /// The current frame with every finding region highlighted.
    pub visualization: RgbImage,
    pub color_stats: Vec<ColorStats>,
    pub debug: Option<DebugArtifacts>,
}

impl Comparison {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Compare two already-normalized frames.
///
/// # Errors
///
/// - [`ClaimDiffError::Config`] if `config` is out of range
/// - [`ClaimDiffError::Detect`] if the images differ in size
///
/// # Example
///
/// ```
/// use claim_diff::{compare, DetectionConfig, Palette, Rgb, RgbImage};
///
/// let frame = RgbImage::new(8, 8, Rgb::new(200, 200, 200));
/// let result = compare(&frame, &frame, &DetectionConfig::default(), &Palette::reference()).unwrap();
/// assert!(!result.has_findings());
/// ```
pub fn compare(
    current: &RgbImage,
    previous: &RgbImage,
    config: &DetectionConfig,
    palette: &Palette,
) -> Result<Comparison, ClaimDiffError> {
    let detector = ChangeDetector::new(palette.clone(), config.clone())?;
    run(&detector, &Visualizer::default(), current, previous)
}

pub(super) fn run(
    detector: &ChangeDetector,
    visualizer: &Visualizer,
    current: &RgbImage,
    previous: &RgbImage,
) -> Result<Comparison, ClaimDiffError> {
    let detection = detector.detect(current, previous)?;
    let visualization = visualizer.render(current, &detection.findings);

    Ok(Comparison {
        report: visualization
            .report
            .with_color_stats(detection.color_stats.clone()),
        visualization: visualization.image,
        findings: detection.findings,
        color_stats: detection.color_stats,
        debug: detection.debug,
    })
}
