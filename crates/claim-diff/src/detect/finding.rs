//! [`Finding`]: one connected region of change.

use serde::{Deserialize, Serialize};

use crate::palette::ColorSpec;
use crate::region::{BoundingBox, Component};

/// What happened to a region between the previous and current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A claim color present before is gone.
    Disappeared,
    /// A claim color is present that was not before.
    Appeared,
    /// Pixels changed without a clear claim color transition.
    Changed,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Disappeared => "disappeared",
            FindingKind::Appeared => "appeared",
            FindingKind::Changed => "changed",
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected region of change. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    kind: FindingKind,
    color: Option<ColorSpec>,
    region: Vec<(usize, usize)>,
    bounding_box: BoundingBox,
}

impl Finding {
    pub(crate) fn from_component(
        component: &Component,
        kind: FindingKind,
        color: Option<ColorSpec>,
    ) -> Self {
        Self {
            kind,
            color,
            region: component.coords().collect(),
            bounding_box: component.bounding_box(),
        }
    }

    #[inline]
    pub fn kind(&self) -> FindingKind {
        self.kind
    }

    /// Palette color the region is attributed to, if any.
    #[inline]
    pub fn color(&self) -> Option<&ColorSpec> {
        self.color.as_ref()
    }

    pub fn color_name(&self) -> Option<&str> {
        self.color.as_ref().map(|c| c.name.as_str())
    }

    /// `(row, col)` of every pixel in the region, row-major.
    #[inline]
    pub fn region(&self) -> &[(usize, usize)] {
        &self.region
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.region.len()
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Midpoint of the bounding box as `(row, col)`.
    #[inline]
    pub fn center(&self) -> (usize, usize) {
        self.bounding_box.center()
    }
}
