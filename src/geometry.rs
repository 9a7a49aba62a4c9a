mod converter;
mod orientation;
mod quad;
mod rect;

pub use converter::{DisplayPolygon, DisplaySize, GeometryConverter};
pub use orientation::Orientation;
pub use quad::{Quad, QuadObservation};
pub use rect::Rect;
