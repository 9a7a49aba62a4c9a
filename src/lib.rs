//! Detect-or-track pipeline for a single rectangle in a camera frame stream.
//!
//! Each frame either runs full detection (when no target is held) or tracks
//! the held target from the previous observation. Accepted observations are
//! mapped from normalized detector space to display coordinates for an
//! outline overlay.
//!
//! ```no_run
//! use recttrack_rs::{DisplaySize, PipelineConfig, TrackerPipeline};
//!
//! let mut pipeline = TrackerPipeline::from_config(
//!     &PipelineConfig::default(),
//!     DisplaySize::new(390.0, 844.0),
//! );
//! # let frames: Vec<recttrack_rs::Frame> = Vec::new();
//! for frame in &frames {
//!     if let Some(report) = pipeline.process_frame(frame) {
//!         println!("{:?}", report.polygon);
//!     }
//! }
//! ```

pub mod detection;
pub mod frame;
pub mod geometry;
pub mod integration;
pub mod tracker;

#[cfg(test)]
mod test_utils;

pub use detection::{DetectorConfig, QuadDetector, RectangleDetector};
pub use frame::{CameraIntrinsics, Frame, FrameError, FrameSource};
pub use geometry::{DisplayPolygon, DisplaySize, GeometryConverter, Orientation, Quad, QuadObservation, Rect};
pub use integration::{
    AsyncTrackerPipeline, FrameReport, OverlaySink, OverlayStyle, PipelineConfig, TrackerPipeline,
};
pub use tracker::{
    ControllerConfig, CornerTracker, CornerTrackerConfig, RectangleTracker, Target, TrackState,
    TrackingController,
};
