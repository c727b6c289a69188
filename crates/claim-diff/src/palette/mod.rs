//! Claim color palette.
//!
//! A [`Palette`] is an ordered list of named [`ColorSpec`] entries. The order
//! matters: when a pixel lies within tolerance of more than one entry, the
//! first entry wins.

mod error;
mod palette;

pub use error::PaletteError;
pub use palette::{ColorSpec, Palette, MAX_PALETTE_SIZE};
