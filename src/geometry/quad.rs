//! Four-corner polygons and the observations built on them.

use nalgebra::Point2;

use crate::geometry::rect::Rect;

/// Four ordered corners: top-left, top-right, bottom-right, bottom-left.
///
/// Coordinates are in whichever space the owner works in (normalized
/// detector space for observations, pixels inside the engines). With the y
/// axis pointing down, the canonical order winds clockwise and
/// [`Quad::signed_area`] is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [Point2<f32>; 4],
}

impl Quad {
    pub fn new(
        top_left: Point2<f32>,
        top_right: Point2<f32>,
        bottom_right: Point2<f32>,
        bottom_left: Point2<f32>,
    ) -> Self {
        Self {
            points: [top_left, top_right, bottom_right, bottom_left],
        }
    }

    pub fn from_points(points: [Point2<f32>; 4]) -> Self {
        Self { points }
    }

    /// Axis-aligned quad covering `rect`.
    pub fn from_rect(rect: &Rect) -> Self {
        Self::from_points(rect.corners().map(|(x, y)| Point2::new(x, y)))
    }

    #[inline]
    pub fn top_left(&self) -> Point2<f32> {
        self.points[0]
    }

    #[inline]
    pub fn top_right(&self) -> Point2<f32> {
        self.points[1]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f32> {
        self.points[2]
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f32> {
        self.points[3]
    }

    /// Shoelace area, positive for clockwise winding in y-down coordinates.
    pub fn signed_area(&self) -> f32 {
        let mut acc = 0.0;
        for i in 0..4 {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    pub fn perimeter(&self) -> f32 {
        (0..4)
            .map(|i| (self.points[(i + 1) % 4] - self.points[i]).norm())
            .sum()
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// True when every turn has the same non-zero orientation.
    pub fn is_convex(&self) -> bool {
        let mut sign = 0.0f32;
        for i in 0..4 {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            let c = self.points[(i + 2) % 4];
            let cross = (b - a).perp(&(c - b));
            if cross.abs() <= f32::EPSILON {
                return false;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    /// Interior angle at each corner, in degrees.
    pub fn corner_angles(&self) -> [f32; 4] {
        let mut angles = [0.0; 4];
        for (i, angle) in angles.iter_mut().enumerate() {
            let corner = self.points[i];
            let prev = self.points[(i + 3) % 4] - corner;
            let next = self.points[(i + 1) % 4] - corner;
            let denom = prev.norm() * next.norm();
            *angle = if denom > 0.0 {
                (prev.dot(&next) / denom).clamp(-1.0, 1.0).acos().to_degrees()
            } else {
                0.0
            };
        }
        angles
    }

    /// Largest deviation of any corner angle from 90 degrees.
    pub fn max_right_angle_deviation(&self) -> f32 {
        self.corner_angles()
            .iter()
            .map(|a| (a - 90.0).abs())
            .fold(0.0, f32::max)
    }

    pub fn bounding_rect(&self) -> Rect {
        let [a, b, c, d] = self.points;
        Rect::from_tlbr(
            a.x.min(b.x).min(c.x).min(d.x),
            a.y.min(b.y).min(c.y).min(d.y),
            a.x.max(b.x).max(c.x).max(d.x),
            a.y.max(b.y).max(c.y).max(d.y),
        )
    }

    /// Scale each axis independently, e.g. pixels to normalized space.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::from_points(self.points.map(|p| Point2::new(p.x * sx, p.y * sy)))
    }
}

/// A detected or tracked rectangle with its confidence.
///
/// Observations are values: an update produces a new observation rather
/// than editing the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadObservation {
    /// Corners in normalized detector space: `x = col / width`,
    /// `y = row / height`, origin at the top-left of the raw buffer.
    /// Engines that report with a bottom-left origin flip `y` to `1 - y`
    /// before building observations.
    pub quad: Quad,
    /// Confidence score in `[0.0, 1.0]`.
    pub confidence: f32,
}

impl QuadObservation {
    /// Create an observation, clamping `confidence` into `[0.0, 1.0]`.
    /// A NaN confidence becomes `0.0`.
    pub fn new(quad: Quad, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { quad, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Quad {
        Quad::from_rect(&Rect::new(0.0, 0.0, 1.0, 1.0))
    }

    #[test]
    fn test_signed_area_is_positive_for_canonical_order() {
        let quad = Quad::from_rect(&Rect::new(2.0, 3.0, 4.0, 5.0));
        assert_relative_eq!(quad.signed_area(), 20.0);
        assert_relative_eq!(quad.perimeter(), 18.0);

        let reversed = Quad::from_points([
            quad.points[0],
            quad.points[3],
            quad.points[2],
            quad.points[1],
        ]);
        assert_relative_eq!(reversed.signed_area(), -20.0);
        assert_relative_eq!(reversed.area(), 20.0);
    }

    #[test]
    fn test_convexity() {
        assert!(unit_square().is_convex());

        let bowtie = Quad::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        );
        assert!(!bowtie.is_convex());

        let collapsed = Quad::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0),
        );
        assert!(!collapsed.is_convex());
    }

    #[test]
    fn test_corner_angles() {
        for angle in unit_square().corner_angles() {
            assert_relative_eq!(angle, 90.0, epsilon = 1e-4);
        }
        assert_relative_eq!(unit_square().max_right_angle_deviation(), 0.0, epsilon = 1e-4);

        let skewed = Quad::new(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 1.0),
            Point2::new(1.0, 1.0),
        );
        assert_relative_eq!(skewed.max_right_angle_deviation(), 45.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bounding_rect() {
        let quad = Quad::new(
            Point2::new(1.0, 2.0),
            Point2::new(5.0, 1.0),
            Point2::new(6.0, 7.0),
            Point2::new(0.0, 6.0),
        );
        assert_eq!(quad.bounding_rect().to_tlbr(), [0.0, 1.0, 6.0, 7.0]);
    }

    #[test]
    fn test_observation_clamps_confidence() {
        assert_eq!(QuadObservation::new(unit_square(), 1.7).confidence, 1.0);
        assert_eq!(QuadObservation::new(unit_square(), -0.2).confidence, 0.0);
        assert_eq!(QuadObservation::new(unit_square(), f32::NAN).confidence, 0.0);
        assert_eq!(QuadObservation::new(unit_square(), 0.5).confidence, 0.5);
    }
}
