//! Template patches located by normalized cross-correlation.
//!
//! Localization slides the patch over a search window with
//! [`imageproc::template_matching`]. The reported score is a zero-mean
//! correlation at the chosen peak, so a textureless window scores 0 rather
//! than the high plain correlation any two flat patches share.

use image::imageops::crop_imm;
use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::template_matching::{MatchTemplateMethod, find_extremes, match_template};

/// Best correlation peak found by [`Patch::search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchMatch {
    /// Sub-pixel position of the patch center.
    pub x: f32,
    pub y: f32,
    /// Zero-mean normalized cross-correlation at the integer peak, in `[-1, 1]`.
    pub score: f32,
}

/// Square luma patch cut around a corner.
#[derive(Debug, Clone)]
pub struct Patch {
    pixels: GrayImage,
    /// Intensities with the patch mean removed, row-major.
    centered: Vec<f32>,
    norm: f32,
    radius: u32,
}

impl Patch {
    /// Cut a `(2 * radius + 1)²` patch centered on the pixel nearest `(x, y)`.
    ///
    /// Returns `None` if the patch does not fit inside the image.
    pub fn extract(image: &GrayImage, x: f32, y: f32, radius: u32) -> Option<Self> {
        let (x0, y0) = window_origin(image.dimensions(), x.round(), y.round(), radius)?;
        let side = 2 * radius + 1;
        let pixels = crop_imm(image, x0, y0, side, side).to_image();

        let centered = zero_mean(pixels.pixels().map(|p| p[0]));
        let norm = centered.iter().map(|v| v * v).sum::<f32>().sqrt();
        Some(Self {
            pixels,
            centered,
            norm,
            radius,
        })
    }

    /// Standard deviation of the patch intensities.
    pub fn std_dev(&self) -> f32 {
        self.norm / (self.centered.len() as f32).sqrt()
    }

    /// Zero-mean correlation with the image window centered on pixel
    /// `(col, row)`.
    ///
    /// `None` if the window leaves the image; `Some(0.0)` if either side is
    /// textureless.
    pub fn correlate(&self, image: &GrayImage, col: i64, row: i64) -> Option<f32> {
        let (x0, y0) = window_origin(image.dimensions(), col as f32, row as f32, self.radius)?;
        let side = 2 * self.radius + 1;
        let window = crop_imm(image, x0, y0, side, side).to_image();
        let centered = zero_mean(window.pixels().map(|p| p[0]));

        let mut cross = 0.0f32;
        let mut energy = 0.0f32;
        for (t, w) in self.centered.iter().zip(&centered) {
            cross += t * w;
            energy += w * w;
        }
        let denom = self.norm * energy.sqrt();
        if denom <= f32::EPSILON {
            return Some(0.0);
        }
        Some((cross / denom).clamp(-1.0, 1.0))
    }

    /// Search for the patch center within `search_radius` pixels of `(x, y)`.
    ///
    /// The integer peak of the correlation map is refined to sub-pixel
    /// accuracy with a parabola fit along each axis. Returns `None` if the
    /// search window, clipped to the image, cannot hold the patch with room
    /// to slide.
    pub fn search(&self, image: &GrayImage, x: f32, y: f32, search_radius: u32) -> Option<PatchMatch> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return None;
        }
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        let reach = i64::from(search_radius) + i64::from(self.radius);
        let x0 = (cx - reach).max(0);
        let y0 = (cy - reach).max(0);
        let x1 = (cx + reach).min(width as i64 - 1);
        let y1 = (cy + reach).min(height as i64 - 1);

        let side = 2 * i64::from(self.radius) + 1;
        let (win_w, win_h) = (x1 - x0 + 1, y1 - y0 + 1);
        if win_w <= side || win_h <= side {
            return None;
        }

        let window = crop_imm(image, x0 as u32, y0 as u32, win_w as u32, win_h as u32).to_image();
        let scores = match_template(
            &window,
            &self.pixels,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );
        let (px, py) = find_extremes(&scores).max_value_location;

        let col = x0 + px as i64 + self.radius as i64;
        let row = y0 + py as i64 + self.radius as i64;
        let score = self.correlate(image, col, row)?;
        Some(PatchMatch {
            x: col as f32 + parabolic_offset(&scores, px, py, false),
            y: row as f32 + parabolic_offset(&scores, px, py, true),
            score,
        })
    }
}

fn zero_mean(values: impl Iterator<Item = u8>) -> Vec<f32> {
    let values: Vec<f32> = values.map(f32::from).collect();
    let mean = values.iter().sum::<f32>() / values.len().max(1) as f32;
    values.into_iter().map(|v| v - mean).collect()
}

/// Top-left (x, y) of the window centered on `(x, y)`, if it fits.
fn window_origin((width, height): (u32, u32), x: f32, y: f32, radius: u32) -> Option<(u32, u32)> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let (col, row) = (x as i64, y as i64);
    let r = radius as i64;
    if col - r < 0 || row - r < 0 || col + r >= width as i64 || row + r >= height as i64 {
        return None;
    }
    Some(((col - r) as u32, (row - r) as u32))
}

/// Vertex offset of the parabola through the peak and its two neighbours.
fn parabolic_offset(scores: &Image<Luma<f32>>, x: u32, y: u32, vertical: bool) -> f32 {
    let (width, height) = scores.dimensions();
    let (prev, next) = if vertical {
        if y == 0 || y + 1 >= height {
            return 0.0;
        }
        (scores.get_pixel(x, y - 1)[0], scores.get_pixel(x, y + 1)[0])
    } else {
        if x == 0 || x + 1 >= width {
            return 0.0;
        }
        (scores.get_pixel(x - 1, y)[0], scores.get_pixel(x + 1, y)[0])
    };
    if !prev.is_finite() || !next.is_finite() {
        return 0.0;
    }
    let peak = scores.get_pixel(x, y)[0];
    let curvature = prev - 2.0 * peak + next;
    if curvature >= 0.0 {
        return 0.0;
    }
    (0.5 * (prev - next) / curvature).clamp(-0.5, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_image(x0: u32, y0: u32) -> GrayImage {
        GrayImage::from_fn(60, 60, |col, row| {
            Luma([if col >= x0 && row >= y0 { 220 } else { 20 }])
        })
    }

    #[test]
    fn test_self_correlation_is_one() {
        let image = corner_image(30, 30);
        let patch = Patch::extract(&image, 30.0, 30.0, 4).unwrap();
        let score = patch.correlate(&image, 30, 30).unwrap();
        assert!((score - 1.0).abs() < 1e-5);
        assert!(patch.std_dev() > 10.0);
    }

    #[test]
    fn test_extract_outside_image_fails() {
        let image = corner_image(30, 30);
        assert!(Patch::extract(&image, 2.0, 30.0, 4).is_none());
        assert!(Patch::extract(&image, 30.0, 57.0, 4).is_none());
        assert!(Patch::extract(&image, f32::NAN, 30.0, 4).is_none());
    }

    #[test]
    fn test_search_finds_shifted_corner() {
        let template_image = corner_image(30, 30);
        let patch = Patch::extract(&template_image, 30.0, 30.0, 5).unwrap();

        let moved = corner_image(34, 27);
        let found = patch.search(&moved, 30.0, 30.0, 8).unwrap();
        assert!((found.x - 34.0).abs() <= 0.5, "x = {}", found.x);
        assert!((found.y - 27.0).abs() <= 0.5, "y = {}", found.y);
        assert!(found.score > 0.99);
    }

    #[test]
    fn test_search_near_the_edge_uses_the_clipped_window() {
        let template_image = corner_image(30, 30);
        let patch = Patch::extract(&template_image, 30.0, 30.0, 5).unwrap();

        let moved = corner_image(8, 9);
        let found = patch.search(&moved, 10.0, 10.0, 8).unwrap();
        assert!((found.x - 8.0).abs() <= 0.5, "x = {}", found.x);
        assert!((found.y - 9.0).abs() <= 0.5, "y = {}", found.y);

        // No room left to slide the patch.
        let tiny = GrayImage::new(11, 11);
        assert!(patch.search(&tiny, 5.0, 5.0, 8).is_none());
        assert!(patch.search(&moved, f32::INFINITY, 10.0, 8).is_none());
    }

    #[test]
    fn test_flat_window_scores_zero() {
        let image = corner_image(30, 30);
        let patch = Patch::extract(&image, 30.0, 30.0, 4).unwrap();
        let flat = GrayImage::from_pixel(60, 60, Luma([20]));
        assert_eq!(patch.correlate(&flat, 30, 30), Some(0.0));

        let found = patch.search(&flat, 30.0, 30.0, 6).unwrap();
        assert_eq!(found.score, 0.0);
    }
}
