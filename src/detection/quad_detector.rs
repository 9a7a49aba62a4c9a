//! Built-in rectangle detection engine.

use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::detection::components::{Component, foreground_components};
use crate::detection::hull::{fit_quad, pixel_hull};
use crate::detection::rectangle_detector::{DetectError, RectangleDetector};
use crate::frame::Frame;
use crate::geometry::{Quad, QuadObservation};

/// Frames narrower or shorter than this are rejected.
const MIN_FRAME_DIM: usize = 8;

/// Configuration for the [`QuadDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Upper bound on returned candidates. `None` returns all of them.
    pub max_observations: Option<usize>,
    /// Minimum candidate area as a fraction of the frame area.
    pub min_size: f32,
    /// Candidates scoring below this confidence are dropped.
    pub min_confidence: f32,
    /// Maximum deviation, in degrees, of any corner angle from 90.
    pub quadrature_tolerance: f32,
    /// Frames whose intensity range is narrower than this have no structure
    /// worth thresholding.
    pub min_contrast: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_observations: Some(10),
            min_size: 0.1,
            min_confidence: 0.0,
            quadrature_tolerance: 30.0,
            min_contrast: 16,
        }
    }
}

/// Finds quadrilateral regions in a luma frame, bright on dark or dark on
/// bright.
///
/// Pipeline: Otsu threshold, 4-connected components of both the mask and its
/// inverse, convex hull of each component's boundary, quadrilateral fit.
/// Regions reaching the frame edge are background and never candidates.
/// Each fit is scored by how well the region fills it and how close its
/// corners are to right angles.
///
/// Orientation and intrinsics are not needed: results are expressed in the
/// raw buffer's normalized space.
#[derive(Debug, Clone, Default)]
pub struct QuadDetector {
    config: DetectorConfig,
}

impl QuadDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Fit and score one region in pixel space.
    fn fit_candidate(&self, component: &Component, min_area: f32) -> Option<(Quad, f32)> {
        let hull = pixel_hull(&component.boundary);
        let quad = fit_quad(&hull)?;
        if quad.area() < min_area {
            return None;
        }
        if quad.max_right_angle_deviation() > self.config.quadrature_tolerance {
            return None;
        }
        let confidence = score(component.pixel_count, &quad);
        (confidence >= self.config.min_confidence).then_some((quad, confidence))
    }
}

impl RectangleDetector for QuadDetector {
    type Error = DetectError;

    fn detect(&self, frame: &Frame) -> Result<Vec<QuadObservation>, Self::Error> {
        if frame.is_empty() {
            return Err(DetectError::EmptyFrame);
        }
        let (width, height) = (frame.width(), frame.height());
        if width < MIN_FRAME_DIM || height < MIN_FRAME_DIM {
            return Err(DetectError::FrameTooSmall { width, height });
        }

        let image = frame.luma.as_ref();
        let Some((lo, hi)) = intensity_range(image) else {
            return Ok(Vec::new());
        };
        if hi - lo < self.config.min_contrast {
            trace!(sequence = frame.sequence, lo, hi, "frame too flat to threshold");
            return Ok(Vec::new());
        }

        let level = otsu_level(image);
        let frame_area = (width * height) as f32;
        let min_area = self.config.min_size * frame_area;
        // A region covering less than half the minimum area cannot fill a
        // large enough quad.
        let min_pixels = ((min_area * 0.5) as usize).max(4);

        let mut candidates = Vec::new();
        for polarity in [ThresholdType::Binary, ThresholdType::BinaryInverted] {
            let mask = threshold(image, level, polarity);
            for component in foreground_components(&mask, min_pixels) {
                if component.touches_border {
                    continue;
                }
                if let Some((quad, confidence)) = self.fit_candidate(&component, min_area) {
                    let normalized = quad.scaled(1.0 / width as f32, 1.0 / height as f32);
                    candidates.push(QuadObservation::new(normalized, confidence));
                }
            }
        }

        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        if let Some(limit) = self.config.max_observations {
            candidates.truncate(limit);
        }

        debug!(
            sequence = frame.sequence,
            orientation = ?frame.orientation,
            level,
            candidates = candidates.len(),
            "rectangle detection finished"
        );
        Ok(candidates)
    }
}

/// Darkest and brightest pixel values, `None` for an empty image.
fn intensity_range(image: &GrayImage) -> Option<(u8, u8)> {
    image.pixels().fold(None, |range, pixel| {
        let v = pixel[0];
        Some(match range {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        })
    })
}

/// Confidence of a pixel-space quad fitted to a region of `pixel_count` pixels.
fn score(pixel_count: usize, quad: &Quad) -> f32 {
    // The quad runs through boundary pixel centers, so it misses half a
    // pixel along the perimeter plus a pixel's worth at the corners.
    let covered = quad.area() + quad.perimeter() / 2.0 + 1.0;
    let count = pixel_count as f32;
    let fill = count.min(covered) / count.max(covered);
    let squareness = 1.0 - quad.max_right_angle_deviation() / 90.0;
    (fill * squareness).clamp(0.0, 1.0)
}
