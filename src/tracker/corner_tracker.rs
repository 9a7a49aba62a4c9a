//! Built-in tracking engine: per-corner template matching under a
//! constant-velocity motion model.

use nalgebra::Point2;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::frame::Frame;
use crate::geometry::{Quad, QuadObservation};
use crate::tracker::kalman_filter::{KalmanFilter, corners_of};
use crate::tracker::rectangle_tracker::{RectangleTracker, TrackError};
use crate::tracker::template::Patch;

/// Configuration for the [`CornerTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerTrackerConfig {
    /// Half-size of each corner template; templates are `(2r + 1)²` pixels.
    pub patch_radius: u32,
    /// How far, in pixels, to search around each predicted corner.
    pub search_radius: u32,
    /// Corners whose seed template is flatter than this (intensity standard
    /// deviation) are not tracked and score zero.
    pub min_patch_std: f32,
}

impl Default for CornerTrackerConfig {
    fn default() -> Self {
        Self {
            patch_radius: 5,
            search_radius: 12,
            min_patch_std: 2.0,
        }
    }
}

/// Motion state seeded from an accepted observation.
#[derive(Debug, Clone)]
struct Seed {
    templates: [Option<Patch>; 4],
    mean: Array1<f64>,
    covariance: Array2<f64>,
    /// (width, height) of the seed frame.
    frame_size: (usize, usize),
}

/// Tracks the four corners of a quad independently.
///
/// Seeding cuts a template around each corner and starts a Kalman filter on
/// the corner positions. Each frame, every template is searched around its
/// predicted position and the matches correct the filter. Confidence is the
/// mean corner correlation, so it decays as corners get occluded, blurred or
/// leave the frame.
#[derive(Debug, Clone, Default)]
pub struct CornerTracker {
    config: CornerTrackerConfig,
    kalman_filter: KalmanFilter,
    seed: Option<Seed>,
}

impl CornerTracker {
    pub fn new(config: CornerTrackerConfig) -> Self {
        Self {
            config,
            kalman_filter: KalmanFilter::default(),
            seed: None,
        }
    }

    pub fn config(&self) -> &CornerTrackerConfig {
        &self.config
    }

    pub fn is_seeded(&self) -> bool {
        self.seed.is_some()
    }
}

fn pixel_quad(observation: &QuadObservation, (width, height): (usize, usize)) -> Quad {
    observation.quad.scaled(width as f32, height as f32)
}

fn flatten(quad: &Quad) -> [f64; 8] {
    let mut out = [0.0; 8];
    for (i, p) in quad.points.iter().enumerate() {
        out[2 * i] = p.x as f64;
        out[2 * i + 1] = p.y as f64;
    }
    out
}

fn unflatten(coords: &[f64; 8]) -> Quad {
    Quad::from_points(std::array::from_fn(|i| {
        Point2::new(coords[2 * i] as f32, coords[2 * i + 1] as f32)
    }))
}

fn is_valid(quad: &Quad) -> bool {
    quad.is_finite() && quad.is_convex()
}

impl RectangleTracker for CornerTracker {
    type Error = TrackError;

    fn seed(&mut self, observation: &QuadObservation, frame: &Frame) -> Result<(), Self::Error> {
        if frame.is_empty() {
            return Err(TrackError::NoImageData);
        }
        let frame_size = (frame.width(), frame.height());
        let quad = pixel_quad(observation, frame_size);
        if !is_valid(&quad) {
            return Err(TrackError::InvalidSeed);
        }

        let image = frame.luma.as_ref();
        let templates = quad.points.map(|p| {
            Patch::extract(image, p.x, p.y, self.config.patch_radius)
                .filter(|t| t.std_dev() >= self.config.min_patch_std)
        });
        if templates.iter().all(Option::is_none) {
            return Err(TrackError::InvalidSeed);
        }

        let (mean, covariance) = self.kalman_filter.initiate(flatten(&quad));
        debug!(
            sequence = frame.sequence,
            corners = templates.iter().filter(|t| t.is_some()).count(),
            "tracker seeded"
        );
        self.seed = Some(Seed {
            templates,
            mean,
            covariance,
            frame_size,
        });
        Ok(())
    }

    fn track(
        &mut self,
        previous: &QuadObservation,
        frame: &Frame,
    ) -> Result<QuadObservation, Self::Error> {
        let seed = self.seed.as_mut().ok_or(TrackError::NotSeeded)?;
        if frame.is_empty() {
            return Err(TrackError::NoImageData);
        }
        let frame_size = (frame.width(), frame.height());
        if frame_size != seed.frame_size {
            return Err(TrackError::FrameSizeChanged {
                expected: seed.frame_size,
                got: frame_size,
            });
        }
        if !is_valid(&pixel_quad(previous, frame_size)) {
            return Err(TrackError::InvalidSeed);
        }

        let (mean, covariance) = self.kalman_filter.predict(&seed.mean, &seed.covariance);
        let predicted = corners_of(&mean);

        let image = frame.luma.as_ref();
        let mut measurement = predicted;
        let mut scores = [0.0f32; 4];
        for (i, template) in seed.templates.iter().enumerate() {
            let Some(template) = template else {
                continue;
            };
            let (px, py) = (predicted[2 * i] as f32, predicted[2 * i + 1] as f32);
            match template.search(image, px, py, self.config.search_radius) {
                Some(found) if found.score > 0.0 => {
                    measurement[2 * i] = found.x as f64;
                    measurement[2 * i + 1] = found.y as f64;
                    scores[i] = found.score;
                }
                _ => {}
            }
        }

        let (mean, covariance) = self
            .kalman_filter
            .update(&mean, &covariance, measurement)
            .ok_or(TrackError::SingularInnovation)?;
        seed.mean = mean;
        seed.covariance = covariance;

        let quad = unflatten(&corners_of(&seed.mean));
        let confidence = if is_valid(&quad) {
            scores.iter().sum::<f32>() / 4.0
        } else {
            0.0
        };
        trace!(
            sequence = frame.sequence,
            confidence,
            scores = ?scores,
            "corners tracked"
        );

        let (width, height) = frame_size;
        Ok(QuadObservation::new(
            quad.scaled(1.0 / width as f32, 1.0 / height as f32),
            confidence,
        ))
    }

    fn reset(&mut self) {
        self.seed = None;
    }
}
