//! Marker-border cropping.

use thiserror::Error;

use crate::color::Rgb;
use crate::palette::ColorSpec;
use crate::raster::{BoolMask, RgbImage};
use crate::region::{label_components, BoundingBox, Component};

/// Error returned when the marker border cannot be located.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CropError {
    /// No closed region of the border color exists, or the largest one
    /// encloses no interior pixels.
    #[error("no marker border matching {border} (tolerance {tolerance}) found")]
    NoBorderFound { border: Rgb, tolerance: u8 },
}

/// Extracts the content enclosed by a colored marker border.
///
/// Pixels matching the border color are grouped into 4-connected regions.
/// Only regions shaped like a closed frame qualify: they cover at least
/// three quarters of their bounding box outline and at most half of the
/// area inside it. The largest qualifying region (earliest in row-major
/// order on ties) defines a bounding box, and the result is the sub-image
/// strictly inside that box, shrunk by an optional extra margin on every
/// side.
///
/// Cropping is deterministic. Cropping an image that no longer contains the
/// border fails with [`CropError::NoBorderFound`] rather than returning a
/// partial image.
#[derive(Debug, Clone)]
pub struct RegionCropper {
    border: ColorSpec,
    margin: usize,
}

impl Default for RegionCropper {
    /// Saturated red border, matching `r >= 180, g <= 75, b <= 75`.
    fn default() -> Self {
        Self::new(ColorSpec::new("border", Rgb::new(255, 0, 0), 75))
    }
}

impl RegionCropper {
    pub fn new(border: ColorSpec) -> Self {
        Self { border, margin: 0 }
    }

    /// Extra pixels to drop inside the border on each side.
    pub fn margin(mut self, margin: usize) -> Self {
        self.margin = margin;
        self
    }

    pub fn border(&self) -> &ColorSpec {
        &self.border
    }

    /// Locate the border and return its bounding box.
    pub fn find_border(&self, image: &RgbImage) -> Result<BoundingBox, CropError> {
        let mask = BoolMask::from_fn(image.width(), image.height(), |i| {
            self.border.matches(image.pixels()[i])
        });

        let mut largest: Option<(usize, BoundingBox)> = None;
        for component in label_components(&mask).iter().filter(|c| is_closed_frame(c)) {
            let size = component.len();
            match largest {
                Some((best, _)) if best >= size => {}
                _ => largest = Some((size, component.bounding_box())),
            }
        }

        largest.map(|(_, bbox)| bbox).ok_or_else(|| self.not_found())
    }

    /// Crop `image` to the interior of its marker border.
    ///
    /// # Errors
    ///
    /// [`CropError::NoBorderFound`] if no border pixels exist or the
    /// interior (after the margin) is empty.
    pub fn crop(&self, image: &RgbImage) -> Result<RgbImage, CropError> {
        let bbox = self.find_border(image)?;
        let inset = 1 + self.margin;

        let row_start = bbox.row_min + inset;
        let col_start = bbox.col_min + inset;
        let row_end = bbox.row_max.saturating_sub(inset - 1);
        let col_end = bbox.col_max.saturating_sub(inset - 1);

        if row_start >= row_end || col_start >= col_end {
            return Err(self.not_found());
        }

        Ok(image.sub_image(row_start..row_end, col_start..col_end))
    }

    fn not_found(&self) -> CropError {
        CropError::NoBorderFound {
            border: self.border.color,
            tolerance: self.border.tolerance,
        }
    }
}

/// Whether `component` outlines its bounding box rather than filling it.
fn is_closed_frame(component: &Component) -> bool {
    let bbox = component.bounding_box();
    let (width, height) = (bbox.width(), bbox.height());
    if width < 3 || height < 3 {
        return false;
    }

    let outline = 2 * (width + height) - 4;
    let interior = (width - 2) * (height - 2);
    let (on_outline, inside) = component.coords().fold((0, 0), |(edge, inner), (row, col)| {
        let on_edge =
            row == bbox.row_min || row == bbox.row_max || col == bbox.col_min || col == bbox.col_max;
        if on_edge {
            (edge + 1, inner)
        } else {
            (edge, inner + 1)
        }
    });

    on_outline * 4 >= outline * 3 && inside * 2 <= interior
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(200, 200, 200);
    const RED: Rgb = Rgb::new(250, 10, 10);

    /// `size x size` image with a one-pixel red frame at `[lo, hi]`.
    fn framed(size: usize, lo: usize, hi: usize) -> RgbImage {
        RgbImage::from_fn(size, size, |r, c| {
            let on_edge = (r == lo || r == hi) && (lo..=hi).contains(&c)
                || (c == lo || c == hi) && (lo..=hi).contains(&r);
            if on_edge {
                RED
            } else {
                Rgb::new(r as u8, c as u8, 100)
            }
        })
    }

    #[test]
    fn test_crop_strictly_inside_border() {
        let image = framed(10, 2, 7);
        let cropped = RegionCropper::default().crop(&image).unwrap();
        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.get(0, 0), Some(Rgb::new(3, 3, 100)));
        assert_eq!(cropped.get(3, 3), Some(Rgb::new(6, 6, 100)));
        assert!(cropped.pixels().iter().all(|&p| p != RED));
    }

    #[test]
    fn test_margin_shrinks_interior() {
        let image = framed(10, 2, 7);
        let cropped = RegionCropper::default().margin(1).crop(&image).unwrap();
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(cropped.get(0, 0), Some(Rgb::new(4, 4, 100)));
    }

    #[test]
    fn test_no_border() {
        let image = RgbImage::new(5, 5, BG);
        let err = RegionCropper::default().crop(&image).unwrap_err();
        assert!(matches!(err, CropError::NoBorderFound { .. }));
    }

    #[test]
    fn test_border_without_interior() {
        let mut image = RgbImage::new(5, 5, BG);
        image.set(1, 1, RED);
        image.set(1, 2, RED);
        assert!(RegionCropper::default().crop(&image).is_err());
    }

    #[test]
    fn test_largest_region_wins() {
        let mut image = framed(12, 3, 9);
        // A small stray red blob outside the frame.
        image.set(0, 0, RED);
        image.set(0, 1, RED);
        let cropped = RegionCropper::default().crop(&image).unwrap();
        assert_eq!(cropped.dimensions(), (5, 5));
        assert_eq!(cropped.get(0, 0), Some(Rgb::new(4, 4, 100)));
    }

    #[test]
    fn test_second_crop_fails_cleanly() {
        let image = framed(10, 2, 7);
        let cropper = RegionCropper::default();
        let once = cropper.crop(&image).unwrap();
        assert!(matches!(
            cropper.crop(&once),
            Err(CropError::NoBorderFound { .. })
        ));
    }

    #[test]
    fn test_solid_blob_is_not_a_border() {
        let mut image = RgbImage::from_fn(20, 12, |r, c| Rgb::new(r as u8, c as u8, 100));
        for r in 1..=6 {
            for c in 1..=6 {
                if r == 1 || r == 6 || c == 1 || c == 6 {
                    image.set(r, c, RED);
                }
            }
        }
        // Larger than the frame, but filled.
        for r in 2..10 {
            for c in 10..18 {
                image.set(r, c, RED);
            }
        }

        let cropped = RegionCropper::default().crop(&image).unwrap();
        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.get(0, 0), Some(Rgb::new(2, 2, 100)));

        let blob_only = RgbImage::from_fn(20, 12, |r, c| {
            if (2..10).contains(&r) && (10..18).contains(&c) {
                RED
            } else {
                BG
            }
        });
        assert!(matches!(
            RegionCropper::default().crop(&blob_only),
            Err(CropError::NoBorderFound { .. })
        ));
    }

    #[test]
    fn test_marker_inside_frame_does_not_crop_again() {
        let mut image = framed(14, 2, 11);
        for r in 5..=7 {
            for c in 5..=7 {
                image.set(r, c, RED);
            }
        }

        let cropper = RegionCropper::default();
        let once = cropper.crop(&image).unwrap();
        assert_eq!(once.dimensions(), (8, 8));
        assert_eq!(once.get(2, 2), Some(RED));
        assert!(matches!(
            cropper.crop(&once),
            Err(CropError::NoBorderFound { .. })
        ));
    }
}
