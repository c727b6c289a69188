//! [`ColorSpec`] and [`Palette`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::PaletteError;
use crate::color::Rgb;

/// Largest number of entries a palette may hold. Class indices are stored
/// as `u8`.
pub const MAX_PALETTE_SIZE: usize = 255;

/// Default per-channel tolerance for reference palette entries.
const DEFAULT_TOLERANCE: u8 = 30;

/// A named claim color.
///
/// A pixel matches when every channel is within `tolerance` of `color`
/// (Chebyshev distance, inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSpec {
    pub name: String,
    pub color: Rgb,
    pub tolerance: u8,
}

impl ColorSpec {
    pub fn new(name: impl Into<String>, color: Rgb, tolerance: u8) -> Self {
        Self {
            name: name.into(),
            color,
            tolerance,
        }
    }

    /// True if `pixel` is within tolerance of this color.
    #[inline]
    pub fn matches(&self, pixel: Rgb) -> bool {
        self.color.channel_distance(pixel) <= self.tolerance
    }

    /// Same entry with a different tolerance.
    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Ordered, validated set of claim colors.
///
/// # Example
///
/// ```
/// use claim_diff::{ColorSpec, Palette, Rgb};
///
/// let palette = Palette::new(vec![
///     ColorSpec::new("red", Rgb::new(255, 0, 0), 10),
///     ColorSpec::new("blue", Rgb::new(0, 0, 255), 10),
/// ])
/// .unwrap();
///
/// assert_eq!(palette.classify(Rgb::new(250, 5, 3)), Some(0));
/// assert_eq!(palette.classify(Rgb::new(128, 128, 128)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<ColorSpec>,
}

impl Palette {
    /// Validate and build a palette.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::EmptyPalette`] if `colors` is empty
    /// - [`PaletteError::EmptyName`] if an entry has a blank name
    /// - [`PaletteError::DuplicateName`] if two entries share a name
    /// - [`PaletteError::TooLarge`] if there are more than [`MAX_PALETTE_SIZE`] entries
    pub fn new(colors: Vec<ColorSpec>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if colors.len() > MAX_PALETTE_SIZE {
            return Err(PaletteError::TooLarge {
                len: colors.len(),
                max: MAX_PALETTE_SIZE,
            });
        }

        let mut seen = HashSet::with_capacity(colors.len());
        for (index, spec) in colors.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(PaletteError::EmptyName { index });
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(PaletteError::DuplicateName {
                    name: spec.name.clone(),
                    index,
                });
            }
        }

        Ok(Self { colors })
    }

    /// The twelve dynmap claim colors, in matching order, each with the given
    /// tolerance.
    pub fn reference_with_tolerance(tolerance: u8) -> Self {
        const REFERENCE: [(&str, [u8; 3]); 12] = [
            ("red", [163, 9, 7]),
            ("green", [10, 166, 40]),
            ("purple", [164, 5, 165]),
            ("blue", [7, 9, 164]),
            ("orange", [244, 166, 6]),
            ("yellow", [243, 242, 86]),
            ("white", [243, 244, 243]),
            ("coral", [240, 87, 85]),
            ("black", [18, 17, 11]),
            ("light_blue", [85, 86, 245]),
            ("teal", [6, 165, 163]),
            ("ice_blue", [169, 234, 243]),
        ];

        Self {
            colors: REFERENCE
                .iter()
                .map(|(name, rgb)| ColorSpec::new(*name, Rgb::from_bytes(*rgb), tolerance))
                .collect(),
        }
    }

    /// Reference palette with the default tolerance of 30.
    pub fn reference() -> Self {
        Self::reference_with_tolerance(DEFAULT_TOLERANCE)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ColorSpec> {
        self.colors.get(index)
    }

    #[inline]
    pub fn colors(&self) -> &[ColorSpec] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorSpec> {
        self.colors.iter()
    }

    /// Index of the entry named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.colors.iter().position(|c| c.name == name)
    }

    /// Index of the first entry `pixel` matches, if any.
    #[inline]
    pub fn classify(&self, pixel: Rgb) -> Option<usize> {
        self.colors.iter().position(|c| c.matches(pixel))
    }

    /// Copy of this palette with every tolerance replaced.
    pub fn with_tolerance(&self, tolerance: u8) -> Self {
        Self {
            colors: self
                .colors
                .iter()
                .cloned()
                .map(|c| c.with_tolerance(tolerance))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a ColorSpec;
    type IntoIter = std::slice::Iter<'a, ColorSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}
