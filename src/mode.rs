use std::fmt;
use std::str::FromStr;

use crate::error::DaemonError;

/// Display mode the desktop is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Hdmi,
    Composite,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Hdmi, Mode::Composite];

    /// Mode matching the scanner's "composite connected" answer
    pub fn from_connected(connected: bool) -> Self {
        if connected { Mode::Composite } else { Mode::Hdmi }
    }

    /// Stable namespace name used for the mode's profile record
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Hdmi => "hdmi",
            Mode::Composite => "composite",
        }
    }

    pub fn is_composite(self) -> bool {
        self == Mode::Composite
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = DaemonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hdmi" => Ok(Mode::Hdmi),
            "composite" => Ok(Mode::Composite),
            _ => Err(DaemonError::UnknownMode(s.to_string())),
        }
    }
}
