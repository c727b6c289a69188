use crate::palette::Palette;
use crate::raster::{BoolMask, RgbImage};

/// Palette class of every pixel of one image.
///
/// Stores one `Option<u8>` palette index per pixel, so a pixel belongs to
/// at most one color by construction. Per-color boolean masks are derived
/// on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    width: usize,
    height: usize,
    palette_len: usize,
    classes: Vec<Option<u8>>,
}

/// Classify every pixel of `image` against `palette` (first match wins).
pub fn classify_all(image: &RgbImage, palette: &Palette) -> ClassMap {
    let classes = image
        .pixels()
        .iter()
        .map(|&px| palette.classify(px).map(|i| i as u8))
        .collect();

    ClassMap {
        width: image.width(),
        height: image.height(),
        palette_len: palette.len(),
        classes,
    }
}

impl ClassMap {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Palette index at a flat row-major index.
    #[inline]
    pub fn class_at(&self, idx: usize) -> Option<usize> {
        self.classes[idx].map(usize::from)
    }

    /// Palette index at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.height && col < self.width {
            self.class_at(row * self.width + col)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_classified(&self, idx: usize) -> bool {
        self.classes[idx].is_some()
    }

    /// Boolean mask of the pixels classified as `color`.
    pub fn mask(&self, color: usize) -> BoolMask {
        let target = Some(color as u8);
        BoolMask::from_fn(self.width, self.height, |i| {
            color < self.palette_len && self.classes[i] == target
        })
    }

    /// One mask per palette entry, in palette order.
    pub fn masks(&self) -> Vec<BoolMask> {
        (0..self.palette_len).map(|c| self.mask(c)).collect()
    }

    /// Number of pixels classified as each palette entry, in palette order.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.palette_len];
        for class in self.classes.iter().flatten() {
            counts[usize::from(*class)] += 1;
        }
        counts
    }

    pub fn count(&self, color: usize) -> usize {
        let target = Some(color as u8);
        self.classes.iter().filter(|&&c| c == target).count()
    }
}
