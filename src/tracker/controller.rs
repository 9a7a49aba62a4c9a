//! Detect-or-track decision state machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::QuadObservation;
use crate::tracker::track_state::{Target, TrackState};

/// Configuration for the [`TrackingController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Tracking updates scoring at least this much are kept (inclusive).
    pub acceptance_threshold: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.5,
        }
    }
}

/// Work the controller wants done on the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Job {
    /// Run full detection.
    Detect,
    /// Track from the given observation.
    Track(QuadObservation),
}

/// Result of running a [`Job`] on a frame. Engine errors are folded in
/// before they reach the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Detection candidates; empty when nothing was found or detection failed.
    Detected(Vec<QuadObservation>),
    /// Updated observation from the tracker.
    Tracked(QuadObservation),
    /// The tracker raised an error.
    TrackingFailed,
}

/// Highest-confidence candidate; ties keep the earliest.
pub fn select_best(candidates: &[QuadObservation]) -> Option<&QuadObservation> {
    candidates.iter().fold(None, |best, c| match best {
        Some(b) if b.confidence >= c.confidence => Some(b),
        _ => Some(c),
    })
}

/// Decides per frame between detection and tracking and owns the single
/// current target.
///
/// Usage per frame: ask [`next_job`](Self::next_job), run it (see
/// `integration::Engine`), then hand the result to [`apply`](Self::apply).
/// The return value of `apply` is the only thing to draw for that frame.
#[derive(Debug, Clone, Default)]
pub struct TrackingController {
    config: ControllerConfig,
    state: TrackState,
    next_target_id: u64,
}

impl TrackingController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            state: TrackState::NoTarget,
            next_target_id: 0,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &TrackState {
        &self.state
    }

    pub fn current(&self) -> Option<&Target> {
        self.state.target()
    }

    pub fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    /// Detect while nothing is held, track otherwise.
    pub fn next_job(&self) -> Job {
        match &self.state {
            TrackState::NoTarget => Job::Detect,
            TrackState::Tracking(target) => Job::Track(target.observation),
        }
    }

    /// Apply the outcome of the job run on frame `sequence`.
    ///
    /// Returns the target to draw for this frame, or `None` when the overlay
    /// must be cleared.
    pub fn apply(&mut self, sequence: u64, outcome: Outcome) -> Option<&Target> {
        self.state = match (self.state, outcome) {
            (_, Outcome::Detected(candidates)) => match select_best(&candidates) {
                Some(best) => {
                    self.next_target_id += 1;
                    debug!(
                        sequence,
                        target = self.next_target_id,
                        confidence = best.confidence,
                        candidates = candidates.len(),
                        "target acquired"
                    );
                    TrackState::Tracking(Target {
                        id: self.next_target_id,
                        observation: *best,
                        start_frame: sequence,
                        frame_id: sequence,
                        tracked_frames: 0,
                    })
                }
                None => TrackState::NoTarget,
            },
            (TrackState::Tracking(target), Outcome::Tracked(observation)) => {
                if observation.confidence >= self.config.acceptance_threshold {
                    TrackState::Tracking(Target {
                        observation,
                        frame_id: sequence,
                        tracked_frames: target.tracked_frames + 1,
                        ..target
                    })
                } else {
                    debug!(
                        sequence,
                        target = target.id,
                        confidence = observation.confidence,
                        threshold = self.config.acceptance_threshold,
                        "target lost: confidence below threshold"
                    );
                    TrackState::NoTarget
                }
            }
            (TrackState::Tracking(target), Outcome::TrackingFailed) => {
                debug!(sequence, target = target.id, "target lost: tracking failed");
                TrackState::NoTarget
            }
            (TrackState::NoTarget, Outcome::Tracked(_) | Outcome::TrackingFailed) => {
                debug!(sequence, "ignoring tracking outcome without a target");
                TrackState::NoTarget
            }
        };
        self.state.target()
    }

    /// Drop the current target; the next frame is detected.
    pub fn reset(&mut self) {
        self.state = TrackState::NoTarget;
    }
}
