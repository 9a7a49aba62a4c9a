//! Runs controller jobs against a detector/tracker pair.

use tracing::warn;

use crate::detection::RectangleDetector;
use crate::frame::Frame;
use crate::tracker::{Job, Outcome, RectangleTracker, select_best};

/// Owns the detection and tracking engines and executes one [`Job`] per frame.
///
/// Engine errors stop here: they are logged and folded into the
/// [`Outcome`], so nothing per-frame propagates to the caller.
pub struct Engine<D, T> {
    detector: D,
    tracker: T,
}

impl<D: RectangleDetector, T: RectangleTracker> Engine<D, T> {
    pub fn new(detector: D, tracker: T) -> Self {
        Self { detector, tracker }
    }

    /// Run `job` on `frame`.
    ///
    /// After a detection the tracker is seeded with the candidate the
    /// controller is going to adopt.
    pub fn execute(&mut self, job: &Job, frame: &Frame) -> Outcome {
        match job {
            Job::Detect => {
                let candidates = match self.detector.detect(frame) {
                    Ok(candidates) => candidates,
                    Err(err) => {
                        warn!(sequence = frame.sequence, error = %err, "detection failed");
                        Vec::new()
                    }
                };
                if let Some(best) = select_best(&candidates) {
                    if let Err(err) = self.tracker.seed(best, frame) {
                        warn!(sequence = frame.sequence, error = %err, "tracker seeding failed");
                        self.tracker.reset();
                    }
                }
                Outcome::Detected(candidates)
            }
            Job::Track(previous) => match self.tracker.track(previous, frame) {
                Ok(observation) => Outcome::Tracked(observation),
                Err(err) => {
                    warn!(sequence = frame.sequence, error = %err, "tracking failed");
                    self.tracker.reset();
                    Outcome::TrackingFailed
                }
            },
        }
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Orientation, Quad, QuadObservation, Rect};
    use image::GrayImage;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("engine unavailable")]
    struct Unavailable;

    struct ScriptedDetector(Result<Vec<QuadObservation>, ()>);

    impl RectangleDetector for ScriptedDetector {
        type Error = Unavailable;

        fn detect(&self, _frame: &Frame) -> Result<Vec<QuadObservation>, Self::Error> {
            self.0.clone().map_err(|_| Unavailable)
        }
    }

    #[derive(Default)]
    struct RecordingTracker {
        seeds: Vec<QuadObservation>,
        fail: bool,
        resets: usize,
    }

    impl RectangleTracker for RecordingTracker {
        type Error = Unavailable;

        fn seed(&mut self, observation: &QuadObservation, _frame: &Frame) -> Result<(), Self::Error> {
            self.seeds.push(*observation);
            Ok(())
        }

        fn track(
            &mut self,
            previous: &QuadObservation,
            _frame: &Frame,
        ) -> Result<QuadObservation, Self::Error> {
            if self.fail {
                Err(Unavailable)
            } else {
                Ok(QuadObservation::new(previous.quad, previous.confidence * 0.9))
            }
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn obs(confidence: f32) -> QuadObservation {
        QuadObservation::new(Quad::from_rect(&Rect::new(0.1, 0.1, 0.5, 0.5)), confidence)
    }

    fn frame() -> Frame {
        Frame::new(1, GrayImage::new(16, 16), Orientation::Portrait)
    }

    #[test]
    fn test_detect_seeds_tracker_with_best_candidate() {
        let mut engine = Engine::new(
            ScriptedDetector(Ok(vec![obs(0.6), obs(0.95), obs(0.7)])),
            RecordingTracker::default(),
        );
        let outcome = engine.execute(&Job::Detect, &frame());
        assert!(matches!(outcome, Outcome::Detected(ref c) if c.len() == 3));
        assert_eq!(engine.tracker().seeds, vec![obs(0.95)]);
    }

    #[test]
    fn test_detection_error_becomes_empty_outcome() {
        let mut engine = Engine::new(ScriptedDetector(Err(())), RecordingTracker::default());
        assert_eq!(engine.execute(&Job::Detect, &frame()), Outcome::Detected(vec![]));
        assert!(engine.tracker().seeds.is_empty());
    }

    #[test]
    fn test_tracking_error_becomes_failure_and_resets() {
        let mut engine = Engine::new(
            ScriptedDetector(Ok(vec![])),
            RecordingTracker {
                fail: true,
                ..Default::default()
            },
        );
        assert_eq!(
            engine.execute(&Job::Track(obs(0.9)), &frame()),
            Outcome::TrackingFailed
        );
        assert_eq!(engine.tracker().resets, 1);

        engine.tracker_mut().fail = false;
        assert!(matches!(
            engine.execute(&Job::Track(obs(0.9)), &frame()),
            Outcome::Tracked(o) if (o.confidence - 0.81).abs() < 1e-6
        ));
    }
}
