//! Previous-frame storage, keyed by map identifier.
//!
//! [`ComparisonCache`] is the seam between the engine and whatever keeps
//! baselines between runs. Implementations must be lossless: the image
//! returned by `get_previous` after `store` must equal the stored image
//! pixel for pixel, or pixel-count comparisons stop being meaningful.

mod memory;

pub use memory::MemoryCache;

use thiserror::Error;

use crate::raster::RgbImage;

/// Failure of a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid map id '{0}'")]
    InvalidMapId(String),
    #[error("cache I/O error for map '{map_id}': {source}")]
    Io {
        map_id: String,
        #[source]
        source: std::io::Error,
    },
    /// The stored baseline exists but cannot be read back as an image.
    #[error("stored baseline for map '{map_id}' is unreadable: {reason}")]
    Corrupt { map_id: String, reason: String },
}

/// Stores the most recent frame per map id.
///
/// `get_previous` returns `Ok(None)` for a map that has never been stored.
/// Implementations keep different map ids fully independent.
pub trait ComparisonCache: Send + Sync {
    fn get_previous(&self, map_id: &str) -> Result<Option<RgbImage>, CacheError>;

    fn store(&self, map_id: &str, image: &RgbImage) -> Result<(), CacheError>;
}
