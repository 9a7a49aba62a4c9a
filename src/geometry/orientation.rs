use serde::{Deserialize, Serialize};

/// Device/display orientation captured together with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Orientation could not be determined. Mapped like `Portrait`.
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    /// Map a platform device-orientation code.
    ///
    /// Codes: 1 portrait, 2 portrait upside down, 3 landscape left,
    /// 4 landscape right. Everything else (0, face up, face down, garbage)
    /// is `Unknown`.
    pub fn from_device_code(code: i64) -> Self {
        match code {
            1 => Self::Portrait,
            2 => Self::PortraitUpsideDown,
            3 => Self::LandscapeLeft,
            4 => Self::LandscapeRight,
            _ => Self::Unknown,
        }
    }
}
