//! TrackerPipeline for combining detection with tracking.

use tracing::{debug, trace};

use crate::detection::{QuadDetector, RectangleDetector};
use crate::frame::{Frame, FrameSource};
use crate::geometry::{DisplayPolygon, DisplaySize, GeometryConverter, Orientation};
use crate::integration::config::PipelineConfig;
use crate::integration::engine::Engine;
use crate::integration::overlay::{OverlaySink, OverlayStyle};
use crate::tracker::{
    ControllerConfig, CornerTracker, RectangleTracker, Target, TrackingController,
};

/// What a processed frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub sequence: u64,
    /// Orientation captured with the frame, used for `polygon`.
    pub orientation: Orientation,
    /// Target held after this frame, if any.
    pub target: Option<Target>,
    /// The target mapped to display space; `None` clears the overlay.
    pub polygon: Option<DisplayPolygon>,
}

impl FrameReport {
    pub(crate) fn new(
        sequence: u64,
        orientation: Orientation,
        target: Option<&Target>,
        display: DisplaySize,
    ) -> Self {
        Self {
            sequence,
            orientation,
            target: target.copied(),
            polygon: target.map(|t| {
                GeometryConverter::to_display(&t.observation.quad, orientation, display)
            }),
        }
    }
}

/// Runs detection or tracking inline for each frame.
///
/// This struct bundles a `RectangleDetector` and a `RectangleTracker` with
/// the `TrackingController` that picks between them. Use
/// [`AsyncTrackerPipeline`](super::AsyncTrackerPipeline) to keep the work
/// off the frame-delivery thread.
pub struct TrackerPipeline<D, T> {
    engine: Engine<D, T>,
    controller: TrackingController,
    display: DisplaySize,
    style: OverlayStyle,
    last_sequence: Option<u64>,
}

impl<D: RectangleDetector, T: RectangleTracker> TrackerPipeline<D, T> {
    /// Create a new pipeline with the given engines and controller config.
    pub fn new(detector: D, tracker: T, config: ControllerConfig, display: DisplaySize) -> Self {
        Self {
            engine: Engine::new(detector, tracker),
            controller: TrackingController::new(config),
            display,
            style: OverlayStyle::default(),
            last_sequence: None,
        }
    }

    /// Create a new pipeline with default controller configuration.
    pub fn with_default_config(detector: D, tracker: T, display: DisplaySize) -> Self {
        Self::new(detector, tracker, ControllerConfig::default(), display)
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Update the rendering surface size, e.g. after a layout change.
    pub fn set_display_size(&mut self, display: DisplaySize) {
        self.display = display;
    }

    /// Process a single frame.
    ///
    /// Detects when no target is held, tracks otherwise. Frames whose
    /// sequence is not newer than the last processed one are skipped and
    /// yield `None`.
    pub fn process_frame(&mut self, frame: &Frame) -> Option<FrameReport> {
        if self.last_sequence.is_some_and(|last| frame.sequence <= last) {
            debug!(sequence = frame.sequence, "skipping out-of-order frame");
            return None;
        }
        self.last_sequence = Some(frame.sequence);

        let job = self.controller.next_job();
        let outcome = self.engine.execute(&job, frame);
        let target = self.controller.apply(frame.sequence, outcome);
        trace!(sequence = frame.sequence, tracking = target.is_some(), "frame processed");

        Some(FrameReport::new(
            frame.sequence,
            frame.orientation,
            target,
            self.display,
        ))
    }

    /// Process a frame and hand its overlay to `sink`.
    pub fn process_and_render<S: OverlaySink>(
        &mut self,
        frame: &Frame,
        sink: &mut S,
    ) -> Option<FrameReport> {
        let report = self.process_frame(frame)?;
        sink.render(report.polygon.as_ref(), &self.style);
        Some(report)
    }

    /// Drain `source`, rendering every processed frame. Returns the number
    /// of frames processed.
    pub fn run<F: FrameSource, S: OverlaySink>(&mut self, source: &mut F, sink: &mut S) -> usize {
        let mut processed = 0;
        while let Some(frame) = source.next_frame() {
            if self.process_and_render(&frame, sink).is_some() {
                processed += 1;
            }
        }
        processed
    }

    /// Get a reference to the controller.
    pub fn controller(&self) -> &TrackingController {
        &self.controller
    }

    /// Get a reference to the underlying engines.
    pub fn engine(&self) -> &Engine<D, T> {
        &self.engine
    }

    /// Get a mutable reference to the underlying engines.
    pub fn engine_mut(&mut self) -> &mut Engine<D, T> {
        &mut self.engine
    }

    pub fn display_size(&self) -> DisplaySize {
        self.display
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Drop the current target and any tracker seed.
    pub fn reset(&mut self) {
        self.controller.reset();
        self.engine.tracker_mut().reset();
    }
}

impl TrackerPipeline<QuadDetector, CornerTracker> {
    /// Pipeline built from the built-in engines.
    pub fn from_config(config: &PipelineConfig, display: DisplaySize) -> Self {
        Self::new(
            QuadDetector::new(config.detector.clone()),
            CornerTracker::new(config.tracker.clone()),
            config.controller.clone(),
            display,
        )
        .with_style(config.style.clone())
    }
}
