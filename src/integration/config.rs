use serde::{Deserialize, Serialize};

use crate::detection::DetectorConfig;
use crate::integration::overlay::OverlayStyle;
use crate::tracker::{ControllerConfig, CornerTrackerConfig};

/// All tunables of a pipeline built from the built-in engines.
///
/// Every section falls back to its defaults, so partial documents are valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub tracker: CornerTrackerConfig,
    pub controller: ControllerConfig,
    pub style: OverlayStyle,
}
