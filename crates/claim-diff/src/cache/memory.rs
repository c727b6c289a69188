use std::collections::HashMap;
use std::sync::RwLock;

use super::{CacheError, ComparisonCache};
use crate::raster::RgbImage;

/// In-process [`ComparisonCache`]. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryCache {
    images: RwLock<HashMap<String, RgbImage>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of maps with a stored frame.
    pub fn len(&self) -> usize {
        self.images.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ComparisonCache for MemoryCache {
    fn get_previous(&self, map_id: &str) -> Result<Option<RgbImage>, CacheError> {
        let images = self.images.read().unwrap_or_else(|e| e.into_inner());
        Ok(images.get(map_id).cloned())
    }

    fn store(&self, map_id: &str, image: &RgbImage) -> Result<(), CacheError> {
        let mut images = self.images.write().unwrap_or_else(|e| e.into_inner());
        images.insert(map_id.to_owned(), image.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_first_get_is_none() {
        let cache = MemoryCache::new();
        assert!(cache.get_previous("world").unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_store_then_get_returns_same_image() {
        let cache = MemoryCache::new();
        let image = RgbImage::from_fn(3, 2, |r, c| Rgb::new(r as u8, c as u8, 7));
        cache.store("world", &image).unwrap();
        assert_eq!(cache.get_previous("world").unwrap(), Some(image));
    }

    #[test]
    fn test_maps_are_independent() {
        let cache = MemoryCache::new();
        cache.store("a", &RgbImage::new(1, 1, Rgb::BLACK)).unwrap();
        cache.store("b", &RgbImage::new(2, 2, Rgb::WHITE)).unwrap();
        cache.store("a", &RgbImage::new(1, 1, Rgb::WHITE)).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get_previous("a").unwrap(),
            Some(RgbImage::new(1, 1, Rgb::WHITE))
        );
        assert_eq!(
            cache.get_previous("b").unwrap(),
            Some(RgbImage::new(2, 2, Rgb::WHITE))
        );
    }
}
