//! Mapping from normalized detector coordinates to display coordinates.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry::orientation::Orientation;
use crate::geometry::quad::Quad;

/// Size of the rendering surface in display units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

impl DisplaySize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Four points in display space, in the same order as the source quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPolygon {
    pub points: [Point2<f32>; 4],
}

impl DisplayPolygon {
    /// Outline path: starts at the last point, then visits all four, closing
    /// the shape.
    pub fn closed_path(&self) -> [Point2<f32>; 5] {
        let [a, b, c, d] = self.points;
        [d, a, b, c, d]
    }
}

/// Stateless converter from detector space to display space.
///
/// The detector's native axes are swapped relative to a portrait screen, so
/// the portrait mapping exchanges x and y.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryConverter;

impl GeometryConverter {
    /// Map a single normalized point.
    pub fn point_to_display(
        point: Point2<f32>,
        orientation: Orientation,
        size: DisplaySize,
    ) -> Point2<f32> {
        let DisplaySize { width, height } = size;
        match orientation {
            Orientation::Portrait | Orientation::Unknown => {
                Point2::new(point.y * width, point.x * height)
            }
            Orientation::LandscapeLeft => Point2::new((1.0 - point.x) * width, point.y * height),
            Orientation::LandscapeRight => Point2::new(point.x * width, (1.0 - point.y) * height),
            Orientation::PortraitUpsideDown => {
                Point2::new((1.0 - point.y) * width, (1.0 - point.x) * height)
            }
        }
    }

    /// Map all four corners of `quad`, preserving their order.
    pub fn to_display(quad: &Quad, orientation: Orientation, size: DisplaySize) -> DisplayPolygon {
        DisplayPolygon {
            points: quad
                .points
                .map(|p| Self::point_to_display(p, orientation, size)),
        }
    }
}
