//! Builder for creating QuadObservation objects from various input formats.

use nalgebra::Point2;

use crate::geometry::{Quad, QuadObservation, Rect};

/// Builder for `QuadObservation`s, for engines that report boxes or raw
/// corners.
#[derive(Debug, Clone, Default)]
pub struct ObservationBuilder {
    quad: Option<Quad>,
    scale: Option<(f32, f32)>,
    confidence: f32,
}

impl ObservationBuilder {
    /// Create a new observation builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an axis-aligned box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.quad = Some(Quad::from_rect(&Rect::from_tlbr(x1, y1, x2, y2)));
        self
    }

    /// Set an axis-aligned box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.tlbr(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }

    /// Set the four corners in top-left, top-right, bottom-right, bottom-left order.
    pub fn corners(mut self, corners: [(f32, f32); 4]) -> Self {
        self.quad = Some(Quad::from_points(corners.map(|(x, y)| Point2::new(x, y))));
        self
    }

    /// Coordinates given so far are pixels of a `width` x `height` image;
    /// normalize them on build.
    pub fn in_pixels(mut self, width: usize, height: usize) -> Self {
        self.scale = Some((width as f32, height as f32));
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Build the final `QuadObservation`. Without geometry the quad collapses
    /// to the origin.
    pub fn build(self) -> QuadObservation {
        let quad = self
            .quad
            .unwrap_or_else(|| Quad::from_points([Point2::origin(); 4]));
        let quad = match self.scale {
            Some((w, h)) if w > 0.0 && h > 0.0 => quad.scaled(1.0 / w, 1.0 / h),
            _ => quad,
        };
        QuadObservation::new(quad, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_builder() {
        let obs = ObservationBuilder::new()
            .tlbr(0.1, 0.2, 0.5, 0.8)
            .confidence(0.95)
            .build();

        assert_eq!(obs.confidence, 0.95);
        assert_eq!(obs.quad.top_left(), Point2::new(0.1, 0.2));
        assert_eq!(obs.quad.bottom_right(), Point2::new(0.5, 0.8));
    }

    #[test]
    fn test_pixel_corners_are_normalized() {
        let obs = ObservationBuilder::new()
            .corners([(20.0, 10.0), (60.0, 10.0), (60.0, 30.0), (20.0, 30.0)])
            .in_pixels(80, 40)
            .confidence(0.7)
            .build();
        assert_eq!(obs.quad.top_left(), Point2::new(0.25, 0.25));
        assert_eq!(obs.quad.bottom_right(), Point2::new(0.75, 0.75));
    }

    #[test]
    fn test_xywh() {
        let obs = ObservationBuilder::new().xywh(0.5, 0.5, 0.2, 0.4).build();
        let rect = obs.quad.bounding_rect();
        assert!((rect.width - 0.2).abs() < 1e-6);
        assert!((rect.height - 0.4).abs() < 1e-6);
    }
}
