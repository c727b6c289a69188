//! Test fixtures: synthetic dynmap-like screenshots.

use claim_diff::{Rgb, RgbImage};
use claimwatch::rendering::encode_rgb_png;

/// Reference claim colors
pub mod colors {
    use claim_diff::Rgb;

    pub const RED: Rgb = Rgb::new(163, 9, 7);
    pub const GREEN: Rgb = Rgb::new(10, 166, 40);
    pub const BLUE: Rgb = Rgb::new(7, 9, 164);
    /// Map background, matches no claim color
    pub const TERRAIN: Rgb = Rgb::new(96, 118, 82);
    /// Crop marker
    pub const BORDER: Rgb = Rgb::new(255, 0, 0);
}

/// A rectangular claim: top-left (row, col), size and color
#[derive(Debug, Clone, Copy)]
pub struct Claim {
    pub row: usize,
    pub col: usize,
    pub height: usize,
    pub width: usize,
    pub color: Rgb,
}

impl Claim {
    pub const fn new(row: usize, col: usize, height: usize, width: usize, color: Rgb) -> Self {
        Self {
            row,
            col,
            height,
            width,
            color,
        }
    }

    fn contains(&self, row: usize, col: usize) -> bool {
        (self.row..self.row + self.height).contains(&row)
            && (self.col..self.col + self.width).contains(&col)
    }
}

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 48;

/// Two claims on terrain
pub fn two_claims() -> [Claim; 2] {
    [
        Claim::new(5, 6, 8, 10, colors::RED),
        Claim::new(24, 30, 10, 12, colors::GREEN),
    ]
}

/// Render claims onto plain terrain
pub fn render(claims: &[Claim]) -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |row, col| {
        claims
            .iter()
            .rev()
            .find(|claim| claim.contains(row, col))
            .map(|claim| claim.color)
            .unwrap_or(colors::TERRAIN)
    })
}

/// Render claims and encode them as PNG
pub fn screenshot(claims: &[Claim]) -> Vec<u8> {
    encode_rgb_png(&render(claims)).expect("Failed to encode fixture")
}

/// Like [`screenshot`], framed by a 1px border marker with `pad` pixels of
/// terrain outside it
pub fn bordered_screenshot(claims: &[Claim], pad: usize) -> Vec<u8> {
    let inner = render(claims);
    let (w, h) = (WIDTH + 2 * (pad + 1), HEIGHT + 2 * (pad + 1));
    let image = RgbImage::from_fn(w, h, |row, col| {
        let in_outer = row >= pad && row < h - pad && col >= pad && col < w - pad;
        let in_inner = row > pad && row < h - pad - 1 && col > pad && col < w - pad - 1;
        if in_inner {
            inner
                .get(row - pad - 1, col - pad - 1)
                .unwrap_or(colors::TERRAIN)
        } else if in_outer {
            colors::BORDER
        } else {
            colors::TERRAIN
        }
    });
    encode_rgb_png(&image).expect("Failed to encode fixture")
}
