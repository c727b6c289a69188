//! Pixel-exact highlight rendering.

use crate::color::Rgb;
use crate::detect::Finding;
use crate::raster::RgbImage;

use super::report::Report;

/// Bright red.
pub const DEFAULT_HIGHLIGHT: Rgb = Rgb::new(255, 0, 0);

/// Output of [`Visualizer::render`].
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub image: RgbImage,
    pub report: Report,
}

/// Paints finding regions onto a base image.
///
/// Exactly the pixels listed in each finding's region are set to the
/// highlight color. Every other pixel keeps its base value.
#[derive(Debug, Clone, Copy)]
pub struct Visualizer {
    highlight: Rgb,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self {
            highlight: DEFAULT_HIGHLIGHT,
        }
    }
}

impl Visualizer {
    pub fn new(highlight: Rgb) -> Self {
        Self { highlight }
    }

    pub fn highlight(&self) -> Rgb {
        self.highlight
    }

    /// Highlighted copy of `base`.
    pub fn paint(&self, base: &RgbImage, findings: &[Finding]) -> RgbImage {
        let mut image = base.clone();
        for finding in findings {
            for &(row, col) in finding.region() {
                image.set(row, col, self.highlight);
            }
        }
        image
    }

    /// Highlighted copy of `base` and the report for `findings`.
    pub fn render(&self, base: &RgbImage, findings: &[Finding]) -> Visualization {
        Visualization {
            image: self.paint(base, findings),
            report: Report::new(findings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{ChangeDetector, DetectionConfig, FindingKind};
    use crate::output::{Center, ColorBreakdown};
    use crate::palette::{ColorSpec, Palette};
    use pretty_assertions::assert_eq;

    const BG: Rgb = Rgb::new(200, 200, 200);
    const RED: Rgb = Rgb::new(163, 9, 7);
    const BLUE: Rgb = Rgb::new(7, 9, 164);

    fn findings() -> (RgbImage, Vec<Finding>) {
        let previous = RgbImage::from_fn(6, 6, |r, c| match (r, c) {
            (0..=1, 0..=1) => RED,
            (4, 2..=5) => BLUE,
            _ => BG,
        });
        let current = RgbImage::new(6, 6, BG);
        let palette = Palette::new(vec![
            ColorSpec::new("red", RED, 30),
            ColorSpec::new("blue", BLUE, 30),
        ])
        .unwrap();
        let detector = ChangeDetector::new(
            palette,
            DetectionConfig::default().min_area(1).use_pixel_count_mode(true),
        )
        .unwrap();
        let findings = detector.detect(&current, &previous).unwrap().findings;
        (current, findings)
    }

    #[test]
    fn test_paint_is_pixel_exact() {
        let (current, findings) = findings();
        let image = Visualizer::default().paint(&current, &findings);

        for row in 0..6 {
            for col in 0..6 {
                let expected_hit = (row < 2 && col < 2) || (row == 4 && col >= 2);
                let expected = if expected_hit { DEFAULT_HIGHLIGHT } else { BG };
                assert_eq!(image.get(row, col), Some(expected), "({row}, {col})");
            }
        }
    }

    #[test]
    fn test_report_summary() {
        let (current, findings) = findings();
        let visualization = Visualizer::default().render(&current, &findings);
        let report = visualization.report;

        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].color_name.as_deref(), Some("red"));
        assert_eq!(report.findings[0].kind, FindingKind::Disappeared);
        assert_eq!(report.findings[1].pixel_count, 4);
        assert_eq!(report.findings[1].center, Center { row: 4, col: 3 });

        assert_eq!(report.summary.total_disappeared, 2);
        assert_eq!(report.summary.total_disappeared_pixels, 8);
        assert_eq!(
            report.summary.per_color.get("blue"),
            Some(&ColorBreakdown {
                regions: 1,
                pixels: 4
            })
        );
    }

    #[test]
    fn test_report_json_shape() {
        let (current, findings) = findings();
        let report = Visualizer::default().render(&current, &findings).report;
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["findings"][0]["color_name"], "red");
        assert_eq!(json["findings"][0]["kind"], "disappeared");
        assert_eq!(json["findings"][0]["bounding_box"]["row_max"], 1);
        assert_eq!(json["summary"]["total_disappeared"], 2);
        assert!(json.get("color_stats").is_none());

        let again = serde_json::to_string(&Report::new(&findings)).unwrap();
        assert_eq!(serde_json::to_string(&report).unwrap(), again);
    }

    #[test]
    fn test_no_findings_leaves_image_untouched() {
        let image = RgbImage::new(3, 3, BG);
        let visualization = Visualizer::new(Rgb::new(0, 255, 0)).render(&image, &[]);
        assert_eq!(visualization.image, image);
        assert!(!visualization.report.has_findings());
    }
}
