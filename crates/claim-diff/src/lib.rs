#![allow(clippy::module_inception)]

//! claim-diff: change detection for dynmap claim screenshots
//!
//! Given two same-sized captures of the same map region, this crate finds
//! the regions where a claim color was present before and is gone now,
//! renders those regions pixel for pixel onto the current frame, and
//! produces a deterministic, serializable report.
//!
//! The crate is synchronous and performs no I/O. Decoding screenshots,
//! persisting baselines and delivering reports belong to the caller; the
//! [`ComparisonCache`] trait is the seam for baseline storage.
//!
//! # Quick Start
//!
//! ```
//! use claim_diff::{compare, ColorSpec, DetectionConfig, FindingKind, Palette, Rgb, RgbImage};
//!
//! let red = Rgb::new(163, 9, 7);
//! let background = Rgb::new(200, 200, 200);
//! let palette = Palette::new(vec![ColorSpec::new("red", red, 30)]).unwrap();
//!
//! let previous = RgbImage::from_fn(4, 4, |r, c| if r < 2 && c < 2 { red } else { background });
//! let current = RgbImage::new(4, 4, background);
//!
//! let config = DetectionConfig::default()
//!     .min_area(1)
//!     .percent_threshold(1.0)
//!     .use_pixel_count_mode(true);
//! let result = compare(&current, &previous, &config, &palette).unwrap();
//!
//! assert_eq!(result.findings.len(), 1);
//! assert_eq!(result.findings[0].kind(), FindingKind::Disappeared);
//! assert_eq!(result.findings[0].bounding_box().as_tuple(), (0, 0, 1, 1));
//! ```
//!
//! # Pipeline
//!
//! 1. **Preprocess** (optional, same settings for both frames):
//!    [`RegionCropper`] cuts out the content inside the marker border,
//!    [`Posterizer`] quantizes channels to damp anti-aliasing noise.
//! 2. **Classify**: every pixel is assigned to the first [`Palette`] entry
//!    whose tolerance band contains it, or to none.
//! 3. **Detect**: [`ChangeDetector`] compares the frames in generic
//!    blob-diff mode or palette-aware pixel-count mode and emits
//!    [`Finding`]s, one per 4-connected region of at least `min_area`
//!    pixels.
//! 4. **Render**: [`Visualizer`] highlights exactly the finding pixels and
//!    builds the [`Report`].
//!
//! # Color Matching
//!
//! Matching uses the Chebyshev distance: a pixel matches a [`ColorSpec`]
//! when no channel differs by more than the entry's tolerance. Tolerance
//! bands of different entries may overlap; palette order then decides,
//! identically for both frames, so per-color counts stay comparable.

pub mod api;
pub mod cache;
pub mod classify;
pub mod color;
pub mod detect;
pub mod output;
pub mod palette;
pub mod preprocess;
pub mod raster;
pub mod region;


pub use api::{compare, ClaimComparer, ClaimDiffError, Comparison, ConfigError};
pub use cache::{CacheError, ComparisonCache, MemoryCache};
pub use classify::{classify_all, ClassMap};
pub use color::{ParseColorError, Rgb};
pub use detect::{
    ChangeDetector, ColorMasks, ColorStats, DebugArtifacts, DetectError, Detection,
    DetectionConfig, Finding, FindingKind,
};
pub use output::{Report, Visualization, Visualizer};
pub use palette::{ColorSpec, Palette, PaletteError};
pub use preprocess::{CropError, Posterizer, RegionCropper};
pub use raster::{BoolMask, RasterError, RgbImage};
pub use region::{label_components, BoundingBox, Component};
