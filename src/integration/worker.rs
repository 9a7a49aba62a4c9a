//! Background execution of detection and tracking jobs.
//!
//! Frames are produced faster than the engines can handle them, so at most
//! one frame is in flight at a time and frames arriving meanwhile are
//! dropped. Controller state is only touched on the caller's side, when a
//! result is collected.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{
    Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError, bounded, unbounded,
};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::detection::{QuadDetector, RectangleDetector};
use crate::frame::Frame;
use crate::geometry::{DisplaySize, Orientation};
use crate::integration::config::PipelineConfig;
use crate::integration::engine::Engine;
use crate::integration::overlay::{OverlaySink, OverlayStyle};
use crate::integration::pipeline::FrameReport;
use crate::tracker::{ControllerConfig, CornerTracker, Job, Outcome, RectangleTracker, TrackingController};

/// A frame paired with the job the controller chose for it.
#[derive(Debug, Clone)]
pub struct WorkRequest {
    pub frame: Frame,
    pub job: Job,
}

/// Outcome of a [`WorkRequest`], tagged with the frame it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkResult {
    pub sequence: u64,
    pub orientation: Orientation,
    pub outcome: Outcome,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("worker is busy with another frame")]
    Busy,
    #[error("worker thread has stopped")]
    Disconnected,
}

/// A dedicated thread that owns an [`Engine`] and runs one request at a time.
pub struct FrameWorker {
    requests: Option<Sender<WorkRequest>>,
    results: Receiver<WorkResult>,
    handle: Option<JoinHandle<()>>,
}

impl FrameWorker {
    pub fn spawn<D, T>(mut engine: Engine<D, T>) -> io::Result<Self>
    where
        D: RectangleDetector + Send + 'static,
        T: RectangleTracker + Send + 'static,
    {
        let (request_tx, request_rx) = bounded::<WorkRequest>(1);
        let (result_tx, result_rx) = unbounded::<WorkResult>();

        let handle = thread::Builder::new()
            .name("recttrack-worker".into())
            .spawn(move || {
                for request in request_rx {
                    let sequence = request.frame.sequence;
                    let outcome = engine.execute(&request.job, &request.frame);
                    let result = WorkResult {
                        sequence,
                        orientation: request.frame.orientation,
                        outcome,
                    };
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
                debug!("frame worker stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Queue a request without blocking.
    pub fn try_dispatch(&self, request: WorkRequest) -> Result<(), DispatchError> {
        let requests = self.requests.as_ref().ok_or(DispatchError::Disconnected)?;
        requests.try_send(request).map_err(|err| match err {
            TrySendError::Full(_) => DispatchError::Busy,
            TrySendError::Disconnected(_) => DispatchError::Disconnected,
        })
    }

    /// Collect a finished result, if one is ready.
    pub fn try_result(&self) -> Result<Option<WorkResult>, DispatchError> {
        match self.results.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(DispatchError::Disconnected),
        }
    }

    /// Wait up to `timeout` for a finished result.
    pub fn recv_result_timeout(&self, timeout: Duration) -> Result<Option<WorkResult>, DispatchError> {
        match self.results.recv_timeout(timeout) {
            Ok(result) => Ok(Some(result)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(DispatchError::Disconnected),
        }
    }

    /// Stop accepting requests and wait for the thread to finish its
    /// current job.
    pub fn shutdown(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("frame worker panicked");
            }
        }
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pipeline whose engines run on a [`FrameWorker`].
///
/// [`submit`](Self::submit) is meant to be called from the frame callback
/// and never blocks. Results are applied to the controller and rendered on
/// the caller's side by [`poll`](Self::poll), which `submit` also calls.
pub struct AsyncTrackerPipeline<S> {
    controller: TrackingController,
    worker: FrameWorker,
    sink: S,
    style: OverlayStyle,
    display: DisplaySize,
    in_flight: Option<u64>,
    last_applied: Option<u64>,
    dropped_frames: u64,
}

impl<S: OverlaySink> AsyncTrackerPipeline<S> {
    pub fn spawn<D, T>(
        engine: Engine<D, T>,
        config: ControllerConfig,
        display: DisplaySize,
        sink: S,
    ) -> io::Result<Self>
    where
        D: RectangleDetector + Send + 'static,
        T: RectangleTracker + Send + 'static,
    {
        Ok(Self {
            controller: TrackingController::new(config),
            worker: FrameWorker::spawn(engine)?,
            sink,
            style: OverlayStyle::default(),
            display,
            in_flight: None,
            last_applied: None,
            dropped_frames: 0,
        })
    }

    /// Pipeline running the built-in engines.
    pub fn from_config(config: &PipelineConfig, display: DisplaySize, sink: S) -> io::Result<Self> {
        let engine = Engine::new(
            QuadDetector::new(config.detector.clone()),
            CornerTracker::new(config.tracker.clone()),
        );
        Ok(Self::spawn(engine, config.controller.clone(), display, sink)?
            .with_style(config.style.clone()))
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Hand a frame to the worker.
    ///
    /// Returns `Ok(false)` when the frame was dropped because another one is
    /// still being processed.
    pub fn submit(&mut self, frame: Frame) -> Result<bool, DispatchError> {
        self.poll()?;
        if self.in_flight.is_some() {
            self.dropped_frames += 1;
            trace!(sequence = frame.sequence, "worker busy, dropping frame");
            return Ok(false);
        }

        let sequence = frame.sequence;
        let job = self.controller.next_job();
        match self.worker.try_dispatch(WorkRequest { frame, job }) {
            Ok(()) => {
                self.in_flight = Some(sequence);
                Ok(true)
            }
            Err(DispatchError::Busy) => {
                self.dropped_frames += 1;
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Apply a finished result if there is one.
    pub fn poll(&mut self) -> Result<Option<FrameReport>, DispatchError> {
        match self.worker.try_result()? {
            Some(result) => Ok(self.apply(result)),
            None => Ok(None),
        }
    }

    /// Block up to `timeout` for the in-flight frame and apply its result.
    pub fn wait_for_result(&mut self, timeout: Duration) -> Result<Option<FrameReport>, DispatchError> {
        match self.worker.recv_result_timeout(timeout)? {
            Some(result) => Ok(self.apply(result)),
            None => Ok(None),
        }
    }

    fn apply(&mut self, result: WorkResult) -> Option<FrameReport> {
        if self.in_flight == Some(result.sequence) {
            self.in_flight = None;
        }
        if self.last_applied.is_some_and(|last| result.sequence <= last) {
            debug!(sequence = result.sequence, "discarding stale result");
            return None;
        }
        self.last_applied = Some(result.sequence);

        let target = self.controller.apply(result.sequence, result.outcome);
        let report = FrameReport::new(result.sequence, result.orientation, target, self.display);
        self.sink.render(report.polygon.as_ref(), &self.style);
        Some(report)
    }

    pub fn set_display_size(&mut self, display: DisplaySize) {
        self.display = display;
    }

    pub fn controller(&self) -> &TrackingController {
        &self.controller
    }

    /// Whether a frame is currently being processed.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Frames dropped because the worker was busy.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
