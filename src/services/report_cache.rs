use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{CheckRecord, MapId};

/// Latest check of one map, ready to be served
#[derive(Clone)]
pub struct LatestCheck {
    pub record: CheckRecord,
    /// Highlighted current frame as PNG, when a comparison ran
    pub visualization_png: Option<Arc<Vec<u8>>>,
}

/// Latest check per map
pub struct ReportCache {
    cache: Arc<RwLock<HashMap<MapId, LatestCheck>>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Replace the latest check for a map
    pub async fn store(&self, map_id: &MapId, latest: LatestCheck) {
        let mut cache = self.cache.write().await;
        cache.insert(map_id.clone(), latest);
    }

    pub async fn get(&self, map_id: &MapId) -> Option<LatestCheck> {
        let cache = self.cache.read().await;
        cache.get(map_id).cloned()
    }

    /// Map ids with a recorded check
    pub async fn map_ids(&self) -> Vec<MapId> {
        let cache = self.cache.read().await;
        let mut ids: Vec<MapId> = cache.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}
