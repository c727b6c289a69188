//! Palette validation errors.

use thiserror::Error;

/// Error type for palette validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    /// No colors provided.
    #[error("palette must contain at least one color")]
    EmptyPalette,
    /// Two entries share a name.
    #[error("duplicate palette color name '{name}' at index {index}")]
    DuplicateName {
        /// Name that appeared twice
        name: String,
        /// Index of the second occurrence
        index: usize,
    },
    /// An entry has an empty name.
    #[error("palette color at index {index} has an empty name")]
    EmptyName { index: usize },
    /// More entries than a class index can address.
    #[error("palette has {len} colors, at most {max} are supported")]
    TooLarge { len: usize, max: usize },
}
