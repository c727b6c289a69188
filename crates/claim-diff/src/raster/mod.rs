//! Pixel grids: the RGB image under comparison and boolean masks over it.
//!
//! Both types store pixels in row-major order and are addressed by
//! `(row, col)`. Flat indices (`row * width + col`) are used internally by
//! the classifier and the component labeling.

mod mask;
mod rgb_image;

pub use mask::BoolMask;
pub use rgb_image::{RasterError, RgbImage};
