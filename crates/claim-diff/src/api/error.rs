//! Unified error type for the claim-diff public API.

use thiserror::Error;

use crate::cache::CacheError;
use crate::color::ParseColorError;
use crate::detect::DetectError;
use crate::palette::PaletteError;
use crate::preprocess::CropError;
use crate::raster::RasterError;

/// Out-of-range parameters, rejected when a component is constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("posterize levels must be between 2 and 256, got {0}")]
    PosterizeLevels(u16),
    #[error("percent threshold must be a finite value between 0 and 100, got {0}")]
    PercentThreshold(f64),
}

/// Every error the crate can return, for `?` propagation in callers.
///
/// # Example
///
/// ```
/// use claim_diff::{ClaimDiffError, ColorSpec, Palette, Rgb};
///
/// fn palette() -> Result<Palette, ClaimDiffError> {
///     let red: Rgb = "#A30907".parse()?;
///     Ok(Palette::new(vec![ColorSpec::new("red", red, 30)])?)
/// }
/// # assert!(palette().is_ok());
/// ```
#[derive(Debug, Error)]
pub enum ClaimDiffError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("palette error: {0}")]
    Palette(#[from] PaletteError),
    #[error("color parse error: {0}")]
    ParseColor(#[from] ParseColorError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),
    #[error("comparison cache error: {0}")]
    Cache(#[from] CacheError),
}

impl ClaimDiffError {
    /// True for [`DetectError::DimensionMismatch`]. Callers treat this as
    /// "no usable baseline" rather than a hard failure.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self, ClaimDiffError::Detect(DetectError::DimensionMismatch { .. }))
    }
}
