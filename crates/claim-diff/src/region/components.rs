use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::raster::BoolMask;

/// Inclusive pixel bounds of a region, `(row_min, col_min, row_max, col_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub row_min: usize,
    pub col_min: usize,
    pub row_max: usize,
    pub col_max: usize,
}

impl BoundingBox {
    /// Box covering a single pixel.
    pub fn point(row: usize, col: usize) -> Self {
        Self {
            row_min: row,
            col_min: col,
            row_max: row,
            col_max: col,
        }
    }

    /// Grow the box to include `(row, col)`.
    pub fn include(&mut self, row: usize, col: usize) {
        self.row_min = self.row_min.min(row);
        self.col_min = self.col_min.min(col);
        self.row_max = self.row_max.max(row);
        self.col_max = self.col_max.max(col);
    }

    pub fn width(&self) -> usize {
        self.col_max - self.col_min + 1
    }

    pub fn height(&self) -> usize {
        self.row_max - self.row_min + 1
    }

    /// Midpoint `(row, col)`, rounded down.
    pub fn center(&self) -> (usize, usize) {
        (
            (self.row_min + self.row_max) / 2,
            (self.col_min + self.col_max) / 2,
        )
    }

    pub fn as_tuple(&self) -> (usize, usize, usize, usize) {
        (self.row_min, self.col_min, self.row_max, self.col_max)
    }
}

/// One 4-connected group of set pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Flat row-major indices, ascending.
    pixels: Vec<usize>,
    width: usize,
    bbox: BoundingBox,
}

impl Component {
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Flat row-major indices, ascending.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.pixels
    }

    /// `(row, col)` coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels.iter().map(|&i| (i / self.width, i % self.width))
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }
}

/// Label every 4-connected region of set pixels in `mask`.
///
/// Components are returned ordered by their first pixel in row-major order.
pub fn label_components(mask: &BoolMask) -> Vec<Component> {
    let width = mask.width();
    let height = mask.height();
    let bits = mask.as_slice();

    let mut visited = vec![false; bits.len()];
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..bits.len() {
        if !bits[start] || visited[start] {
            continue;
        }

        visited[start] = true;
        queue.push_back(start);
        let mut pixels = Vec::new();
        let mut bbox = BoundingBox::point(start / width, start % width);

        while let Some(idx) = queue.pop_front() {
            pixels.push(idx);
            let row = idx / width;
            let col = idx % width;
            bbox.include(row, col);

            let mut visit = |n: usize| {
                if bits[n] && !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            };
            if row > 0 {
                visit(idx - width);
            }
            if row + 1 < height {
                visit(idx + width);
            }
            if col > 0 {
                visit(idx - 1);
            }
            if col + 1 < width {
                visit(idx + 1);
            }
        }

        pixels.sort_unstable();
        components.push(Component {
            pixels,
            width,
            bbox,
        });
    }

    components
}
