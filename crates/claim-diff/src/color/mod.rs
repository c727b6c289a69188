//! 8-bit RGB color type and hex parsing.
//!
//! Captured map screenshots are plain 8-bit sRGB. Every comparison in this
//! crate works on raw channel values, so there is a single color type
//! ([`Rgb`]) and no color space conversion.

mod rgb;

pub use rgb::{ParseColorError, Rgb};
