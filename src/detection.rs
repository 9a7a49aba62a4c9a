//! Full-frame rectangle detection.
//!
//! [`RectangleDetector`] is the seam for detection engines; [`QuadDetector`]
//! is the built-in engine, a classical threshold-and-fit pipeline.

mod components;
mod hull;
mod quad_detector;
mod rectangle_detector;

pub use quad_detector::{DetectorConfig, QuadDetector};
pub use rectangle_detector::{DetectError, RectangleDetector};
