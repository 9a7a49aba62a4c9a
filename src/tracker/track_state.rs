use crate::geometry::QuadObservation;

/// The rectangle currently held by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Identifier assigned when a detection is adopted; kept while tracked.
    pub id: u64,
    /// Latest accepted observation.
    pub observation: QuadObservation,
    /// Sequence of the frame whose detection started this target.
    pub start_frame: u64,
    /// Sequence of the frame that produced `observation`.
    pub frame_id: u64,
    /// Number of accepted tracking updates since adoption.
    pub tracked_frames: u32,
}

/// Controller state. Observation data only exists while tracking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TrackState {
    /// Nothing accepted: the next frame is detected.
    #[default]
    NoTarget,
    /// A target is held: the next frame is tracked.
    Tracking(Target),
}

impl TrackState {
    pub fn is_tracking(&self) -> bool {
        matches!(self, Self::Tracking(_))
    }

    pub fn target(&self) -> Option<&Target> {
        match self {
            Self::Tracking(target) => Some(target),
            Self::NoTarget => None,
        }
    }
}
