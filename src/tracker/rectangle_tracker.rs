//! Trait for incremental rectangle tracking engines.

use thiserror::Error;

use crate::frame::Frame;
use crate::geometry::QuadObservation;

/// Errors raised by the built-in [`CornerTracker`](super::CornerTracker).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("tracker has not been seeded")]
    NotSeeded,
    #[error("seed geometry is degenerate")]
    InvalidSeed,
    #[error("frame has no pixel data")]
    NoImageData,
    #[error("frame size changed from {expected:?} to {got:?} while tracking")]
    FrameSizeChanged {
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("innovation covariance is singular")]
    SingularInnovation,
}

/// Incremental tracking of a single quadrilateral.
///
/// Trackers keep motion state across calls. Whenever the controller adopts a
/// new detection, the tracker is reseeded with [`seed`](Self::seed); every
/// following frame is handed to [`track`](Self::track) together with the
/// last accepted observation. Tracking should degrade gracefully: lower the
/// confidence when the region gets ambiguous rather than failing.
pub trait RectangleTracker {
    /// Error type for tracking failures.
    type Error: std::error::Error;

    /// Start tracking `observation`, as seen in `frame`.
    fn seed(&mut self, observation: &QuadObservation, frame: &Frame) -> Result<(), Self::Error>;

    /// Produce an updated observation of `previous` in `frame`.
    fn track(
        &mut self,
        previous: &QuadObservation,
        frame: &Frame,
    ) -> Result<QuadObservation, Self::Error>;

    /// Forget the current seed.
    fn reset(&mut self) {}
}
