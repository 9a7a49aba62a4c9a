//! Integration module for running rectangle detection and tracking on a
//! frame stream.
//!
//! This module wires a [`RectangleDetector`](crate::detection::RectangleDetector)
//! and a [`RectangleTracker`](crate::tracker::RectangleTracker) to the
//! controller and hands the result to an [`OverlaySink`], either inline
//! ([`TrackerPipeline`]) or on a worker thread ([`AsyncTrackerPipeline`]).

mod builder;
mod config;
mod engine;
mod overlay;
mod pipeline;
mod worker;

pub use builder::ObservationBuilder;
pub use config::PipelineConfig;
pub use engine::Engine;
pub use overlay::{OverlaySink, OverlayStyle};
pub use pipeline::{FrameReport, TrackerPipeline};
pub use worker::{AsyncTrackerPipeline, DispatchError, FrameWorker, WorkRequest, WorkResult};
