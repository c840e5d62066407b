//! Error types for the daemon
//!
//! Most failures propagate as `anyhow::Error` with context attached at the
//! I/O boundary. The variants here are the conditions callers match on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DaemonError {
    /// The adapter exposes no composite-capable output at all
    #[error(
        "No composite-capable output found on this display adapter \
         (set {var} to run anyway)",
        var = crate::constants::env::DEBUG_OVERRIDE
    )]
    NoCompositeOutput,

    /// The X server lacks RandR or reports a version that is too old
    #[error("RandR {major}.{minor} or newer is required")]
    RandrUnavailable { major: u32, minor: u32 },

    /// A mode name given on the command line or in a file was not recognised
    #[error("Unknown mode '{0}' (expected 'hdmi' or 'composite')")]
    UnknownMode(String),

    /// `gsettings` printed something that does not parse as the expected kind
    #[error("Unexpected value for {key}: '{raw}'")]
    MalformedSetting { key: String, raw: String },
}
