//! Lossless on-disk [`ComparisonCache`].
//!
//! Each map keeps one baseline at `baselines/<map>/previous.png`, written as
//! 8-bit RGB PNG so that the next run reads back exactly the stored pixels.
//! Writes go to a temporary file that is renamed into place, so a crash
//! never leaves a truncated baseline behind.

use claim_diff::{CacheError, ComparisonCache, RgbImage};
use std::io;
use std::path::PathBuf;

use crate::models::MapId;
use crate::rendering::{decode_png, encode_rgb_png};

pub const BASELINE_FILE: &str = "previous.png";

/// Baseline storage rooted at `<data_dir>/baselines`.
#[derive(Debug, Clone)]
pub struct PngBaselineStore {
    root: PathBuf,
}

impl PngBaselineStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the baseline for `map_id`.
    pub fn path_for(&self, map_id: &MapId) -> PathBuf {
        self.root.join(map_id.as_str()).join(BASELINE_FILE)
    }

    fn validate(map_id: &str) -> Result<MapId, CacheError> {
        MapId::parse(map_id).map_err(|e| CacheError::InvalidMapId(e.0))
    }
}

impl ComparisonCache for PngBaselineStore {
    fn get_previous(&self, map_id: &str) -> Result<Option<RgbImage>, CacheError> {
        let id = Self::validate(map_id)?;
        let path = self.path_for(&id);

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    map_id: map_id.to_string(),
                    source,
                })
            }
        };

        decode_png(&bytes)
            .map(Some)
            .map_err(|e| CacheError::Corrupt {
                map_id: map_id.to_string(),
                reason: e.to_string(),
            })
    }

    fn store(&self, map_id: &str, image: &RgbImage) -> Result<(), CacheError> {
        let id = Self::validate(map_id)?;
        let path = self.path_for(&id);
        let io_err = |source| CacheError::Io {
            map_id: map_id.to_string(),
            source,
        };

        let png = encode_rgb_png(image).map_err(|e| {
            io_err(io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
        })?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let tmp = path.with_extension("png.tmp");
        std::fs::write(&tmp, &png).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)?;

        tracing::debug!(
            map_id,
            width = image.width(),
            height = image.height(),
            path = %path.display(),
            "Stored baseline"
        );
        Ok(())
    }
}
