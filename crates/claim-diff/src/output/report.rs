//! JSON-serializable comparison report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::detect::{ColorStats, Finding, FindingKind};
use crate::region::BoundingBox;

/// Midpoint of a finding's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Center {
    pub row: usize,
    pub col: usize,
}

/// One finding in report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingReport {
    /// `None` for changes not attributed to a palette color.
    pub color_name: Option<String>,
    pub kind: FindingKind,
    pub pixel_count: usize,
    pub bounding_box: BoundingBox,
    pub center: Center,
}

impl From<&Finding> for FindingReport {
    fn from(finding: &Finding) -> Self {
        let (row, col) = finding.center();
        Self {
            color_name: finding.color_name().map(str::to_owned),
            kind: finding.kind(),
            pixel_count: finding.pixel_count(),
            bounding_box: finding.bounding_box(),
            center: Center { row, col },
        }
    }
}

/// Disappeared regions and pixels of one color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColorBreakdown {
    pub regions: usize,
    pub pixels: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_findings: usize,
    pub total_disappeared: usize,
    pub total_disappeared_pixels: usize,
    pub total_appeared: usize,
    pub total_changed: usize,
    /// Disappearances keyed by color name.
    pub per_color: BTreeMap<String, ColorBreakdown>,
}

/// Ordered findings plus summary counts.
///
/// Building a report from the same findings in the same order always
/// yields the same value and the same JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub findings: Vec<FindingReport>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub color_stats: Vec<ColorStats>,
}

impl Report {
    pub fn new(findings: &[Finding]) -> Self {
        let mut summary = Summary {
            total_findings: findings.len(),
            ..Summary::default()
        };

        for finding in findings {
            match finding.kind() {
                FindingKind::Disappeared => {
                    summary.total_disappeared += 1;
                    summary.total_disappeared_pixels += finding.pixel_count();
                    if let Some(name) = finding.color_name() {
                        let entry = summary.per_color.entry(name.to_owned()).or_default();
                        entry.regions += 1;
                        entry.pixels += finding.pixel_count();
                    }
                }
                FindingKind::Appeared => summary.total_appeared += 1,
                FindingKind::Changed => summary.total_changed += 1,
            }
        }

        Self {
            findings: findings.iter().map(FindingReport::from).collect(),
            summary,
            color_stats: Vec::new(),
        }
    }

    /// Attach per-color pixel statistics.
    pub fn with_color_stats(mut self, color_stats: Vec<ColorStats>) -> Self {
        self.color_stats = color_stats;
        self
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}
