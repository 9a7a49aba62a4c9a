mod controller;
mod corner_tracker;
mod kalman_filter;
mod rectangle_tracker;
mod template;
mod track_state;

pub use controller::{ControllerConfig, Job, Outcome, TrackingController, select_best};
pub use corner_tracker::{CornerTracker, CornerTrackerConfig};
pub use rectangle_tracker::{RectangleTracker, TrackError};
pub use track_state::{Target, TrackState};
