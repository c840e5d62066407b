//! Commands funnelled into the dispatcher thread

use crate::mode::Mode;

/// Everything that can drive the state machine, from any thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// RandR reported an output or screen change
    TopologyChanged,

    /// Bypass the scanner and switch to composite (true) or HDMI (false)
    ForceMode(bool),

    /// A mode's stored profile record was modified
    ProfileChanged(Mode),

    /// Forget both profiles
    ResetProfiles,

    /// Leave the dispatch loop
    Shutdown,
}

impl Command {
    /// Repeats of this command queued back to back need handling only once
    pub fn coalesces(self) -> bool {
        matches!(self, Command::TopologyChanged | Command::ProfileChanged(_))
    }
}
