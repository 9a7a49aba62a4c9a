//! Convex hulls and quadrilateral fitting.

use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use nalgebra::Point2;

use crate::geometry::Quad;

const EPSILON: f32 = 1e-6;

#[inline]
fn cross(o: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a - o).perp(&(b - o))
}

/// Convex hull of pixel coordinates, as float points.
///
/// Collinear points are dropped, so a filled axis-aligned rectangle yields
/// exactly its four corner pixels.
pub fn pixel_hull(points: &[Point<i32>]) -> Vec<Point2<f32>> {
    // The hull's angular sort needs distinct points.
    let mut unique = points.to_vec();
    unique.sort_by_key(|p| (p.y, p.x));
    unique.dedup();
    convex_hull(unique)
        .into_iter()
        .map(|p| Point2::new(p.x as f32, p.y as f32))
        .collect()
}

/// Approximate a convex hull by a quadrilateral.
///
/// Uses the longest hull diagonal and the hull vertex farthest from it on
/// each side. Returns `None` if the hull is degenerate (fewer than four
/// vertices, or everything on one side of the diagonal).
pub fn fit_quad(hull: &[Point2<f32>]) -> Option<Quad> {
    if hull.len() < 4 {
        return None;
    }

    let mut best = (0usize, 0usize, 0.0f32);
    for i in 0..hull.len() {
        for j in (i + 1)..hull.len() {
            let d = (hull[j] - hull[i]).norm_squared();
            if d > best.2 {
                best = (i, j, d);
            }
        }
    }
    let (a, b) = (hull[best.0], hull[best.1]);

    let mut left = (EPSILON, None);
    let mut right = (-EPSILON, None);
    for &p in hull {
        let side = cross(a, b, p);
        if side > left.0 {
            left = (side, Some(p));
        }
        if side < right.0 {
            right = (side, Some(p));
        }
    }

    let (c, d) = (left.1?, right.1?);
    Some(canonical_order([a, c, b, d]))
}

/// Reorder four cyclically ordered corners into TL, TR, BR, BL.
///
/// The winding is made clockwise (y down), then the rotation whose corners
/// lie closest to the matching corners of the bounding box is chosen.
pub fn canonical_order(points: [Point2<f32>; 4]) -> Quad {
    let mut quad = Quad::from_points(points);
    if quad.signed_area() < 0.0 {
        quad.points.swap(1, 3);
    }

    let targets = quad.bounding_rect().corners();
    let cost = |shift: usize| -> f32 {
        (0..4)
            .map(|k| {
                let p = quad.points[(k + shift) % 4];
                let (tx, ty) = targets[k];
                (p.x - tx).powi(2) + (p.y - ty).powi(2)
            })
            .sum()
    };

    let shift = (0..4)
        .min_by(|&s, &t| cost(s).total_cmp(&cost(t)))
        .unwrap_or(0);
    let p = quad.points;
    Quad::from_points([p[shift], p[(shift + 1) % 4], p[(shift + 2) % 4], p[(shift + 3) % 4]])
}
