//! Interface to the overlay renderer.

use serde::{Deserialize, Serialize};

use crate::geometry::DisplayPolygon;

/// How the outline is stroked. The polygon is never filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Stroke color as RGBA.
    pub color: [u8; 4],
    /// Stroke width in display units.
    pub line_width: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: [0, 255, 0, 255],
            line_width: 2.0,
        }
    }
}

/// Receives the overlay for each processed frame.
///
/// Called exactly once per processed frame, from the control context.
/// `None` means the previous overlay must be removed.
pub trait OverlaySink {
    fn render(&mut self, polygon: Option<&DisplayPolygon>, style: &OverlayStyle);
}

impl<S: OverlaySink + ?Sized> OverlaySink for &mut S {
    fn render(&mut self, polygon: Option<&DisplayPolygon>, style: &OverlayStyle) {
        (**self).render(polygon, style);
    }
}
