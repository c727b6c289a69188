//! [`BoolMask`]: a width x height grid of booleans.

/// A boolean grid in row-major order, the same shape as the image it was
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BoolMask {
    /// An all-false mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Build a mask by evaluating `f(flat_index)` for every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl FnMut(usize) -> bool) -> Self {
        Self {
            width,
            height,
            bits: (0..width * height).map(f).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Value at `(row, col)`; false outside the mask.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.bits[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if row < self.height && col < self.width {
            self.bits[row * self.width + col] = value;
        }
    }

    /// Value at a flat row-major index.
    #[inline]
    pub fn get_index(&self, idx: usize) -> bool {
        self.bits[idx]
    }

    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Pixels set in `self` but not in `other` (`self AND NOT other`).
    ///
    /// Both masks must have the same shape.
    pub fn and_not(&self, other: &BoolMask) -> BoolMask {
        debug_assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "and_not on masks of different shape"
        );
        Self {
            width: self.width,
            height: self.height,
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(&a, &b)| a && !b)
                .collect(),
        }
    }

    /// Flat indices of set pixels, ascending.
    pub fn set_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    /// One byte per pixel: 255 for set, 0 for clear. Used for debug images.
    pub fn to_gray_bytes(&self) -> Vec<u8> {
        self.bits.iter().map(|&b| if b { 255 } else { 0 }).collect()
    }
}
