//! Synthetic frames for unit tests.

use image::{GrayImage, Luma};
use nalgebra::Point2;

use crate::frame::Frame;
use crate::geometry::Orientation;

pub(crate) const BACKGROUND: u8 = 20;
pub(crate) const FOREGROUND: u8 = 220;

/// Render a filled convex polygon (pixel coordinates, any winding).
///
/// A pixel is foreground when its center lies inside or on the polygon.
pub(crate) fn draw_polygon(width: usize, height: usize, corners: &[Point2<f32>]) -> GrayImage {
    GrayImage::from_fn(width as u32, height as u32, |col, row| {
        let p = Point2::new(col as f32, row as f32);
        let mut pos = false;
        let mut neg = false;
        for i in 0..corners.len() {
            let a = corners[i];
            let b = corners[(i + 1) % corners.len()];
            let side = (b - a).perp(&(p - a));
            pos |= side > 1e-4;
            neg |= side < -1e-4;
        }
        Luma([if pos && neg { BACKGROUND } else { FOREGROUND }])
    })
}

/// Frame with one axis-aligned rectangle of value `inside` covering columns
/// `x0..=x1` and rows `y0..=y1`, everything else `outside`.
pub(crate) fn shaded_rect_frame(
    sequence: u64,
    width: usize,
    height: usize,
    (x0, y0, x1, y1): (usize, usize, usize, usize),
    inside: u8,
    outside: u8,
) -> Frame {
    let luma = GrayImage::from_fn(width as u32, height as u32, |col, row| {
        let (col, row) = (col as usize, row as usize);
        if (x0..=x1).contains(&col) && (y0..=y1).contains(&row) {
            Luma([inside])
        } else {
            Luma([outside])
        }
    });
    Frame::new(sequence, luma, Orientation::Portrait)
}

/// Bright rectangle on a dark background.
pub(crate) fn rect_frame(
    sequence: u64,
    width: usize,
    height: usize,
    bounds: (usize, usize, usize, usize),
) -> Frame {
    shaded_rect_frame(sequence, width, height, bounds, FOREGROUND, BACKGROUND)
}

/// Dark rectangle on a bright background.
pub(crate) fn dark_rect_frame(
    sequence: u64,
    width: usize,
    height: usize,
    bounds: (usize, usize, usize, usize),
) -> Frame {
    shaded_rect_frame(sequence, width, height, bounds, BACKGROUND, FOREGROUND)
}

/// Frame with no structure at all.
pub(crate) fn blank_frame(sequence: u64, width: usize, height: usize) -> Frame {
    Frame::new(
        sequence,
        GrayImage::from_pixel(width as u32, height as u32, Luma([BACKGROUND])),
        Orientation::Portrait,
    )
}
