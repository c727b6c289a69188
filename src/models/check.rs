use chrono::{DateTime, Utc};
use claim_diff::Report;
use serde::Serialize;
use utoipa::ToSchema;

use super::map_id::MapId;

/// What a monitoring step did with the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// No baseline existed; the image became the baseline.
    FirstRun,
    /// The baseline had different dimensions and was replaced.
    Rebaselined,
    /// The image was compared against the baseline, which was then replaced.
    Compared,
}

/// Result of one monitoring step, as written to `changes_<map>_NNN.json`
/// and returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckRecord {
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = String)]
    pub map_id: MapId,
    pub outcome: CheckOutcome,
    pub changes_detected: bool,
    pub num_changes: usize,
    /// Compared frame size as `[width, height]`
    #[schema(value_type = Vec<usize>)]
    pub dimensions: (usize, usize),
    /// SHA-256 of the submitted PNG bytes
    pub image_sha256: String,
    /// Source file, when the image came from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_image: Option<String>,
    /// True when cropping was requested but the border was missing
    pub crop_fallback: bool,
    /// Findings report, present for `compared`
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_file: Option<String>,
}

impl CheckRecord {
    /// Process exit code for this outcome: 1 with findings, otherwise 0.
    pub fn exit_code(&self) -> u8 {
        if self.changes_detected {
            1
        } else {
            0
        }
    }
}
