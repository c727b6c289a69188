//! Optional normalization applied to both frames before comparison.
//!
//! - [`Posterizer`] quantizes each channel to a fixed number of evenly
//!   spaced levels, so that renderer anti-aliasing noise does not move a
//!   pixel in or out of a palette tolerance band between captures.
//! - [`RegionCropper`] cuts the map content out of the marker border the
//!   capture tool draws around it.
//!
//! Both must be applied with identical settings to the two images of a
//! comparison. Nothing here can check that; it is the caller's job.

mod crop;
mod posterize;

pub use crop::{CropError, RegionCropper};
pub use posterize::Posterizer;
