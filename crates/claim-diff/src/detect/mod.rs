//! Change detection between two captures of the same map.
//!
//! [`ChangeDetector`] runs in one of two modes, selected by
//! [`DetectionConfig::use_pixel_count_mode`]:
//!
//! - **Generic blob diff**: pixels whose channel distance between frames
//!   exceeds `pixel_diff_threshold` are grouped into 4-connected
//!   components. Each component of at least `min_area` pixels becomes a
//!   [`Finding`], labelled by the dominant palette color of the region in
//!   each frame.
//! - **Pixel count**: both frames are classified against the palette and
//!   the per-color pixel counts compared. For every color whose count
//!   dropped past the threshold, the exact set of pixels that held the
//!   color before but not after is split into components, each of at
//!   least `min_area` pixels becoming a `Disappeared` finding.
//!
//! Neither mode has side effects. No findings is a valid result.

mod config;
mod detector;
mod finding;

pub use config::DetectionConfig;
pub use detector::{ChangeDetector, ColorMasks, ColorStats, DebugArtifacts, DetectError, Detection};
pub use finding::{Finding, FindingKind};
