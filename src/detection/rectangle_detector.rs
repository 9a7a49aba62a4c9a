//! Trait for full-frame rectangle detection engines.

use thiserror::Error;

use crate::frame::Frame;
use crate::geometry::QuadObservation;

/// Errors raised by the built-in [`QuadDetector`](super::QuadDetector).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("frame has no pixel data")]
    EmptyFrame,
    #[error("frame of {width}x{height} pixels is too small to search")]
    FrameTooSmall { width: usize, height: usize },
}

/// Full-frame quadrilateral detection.
///
/// Implement this trait to plug any detection engine into the pipeline.
/// Detection is stateless and expensive: it searches the whole frame with no
/// temporal assumption and is never run on the frame-delivery path.
///
/// # Example
///
/// ```ignore
/// use recttrack_rs::{Frame, QuadObservation, RectangleDetector};
///
/// struct MyDetector;
///
/// impl RectangleDetector for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&self, frame: &Frame) -> Result<Vec<QuadObservation>, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait RectangleDetector {
    /// Error type for detection failures.
    type Error: std::error::Error;

    /// Run detection on one frame.
    ///
    /// The frame carries its orientation and optional intrinsics.
    ///
    /// # Returns
    /// Candidates in normalized detector space sorted by descending
    /// confidence (possibly empty), or an error if the engine could not run.
    fn detect(&self, frame: &Frame) -> Result<Vec<QuadObservation>, Self::Error>;
}
