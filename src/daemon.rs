//! Scanner + state machine, driven by the dispatcher

use anyhow::Result;
use tracing::{info, warn};

use crate::config::persistent::ProfileStorage;
use crate::mode::Mode;
use crate::scanner::{ensure_supported, scan, DisplayAdapter};
use crate::settings::LiveSettings;
use crate::state::{ModePublisher, StateMachine};

pub struct Daemon<A, S, L, P> {
    adapter: A,
    machine: StateMachine<S, L, P>,
    debug_override: bool,
    restore_hdmi_on_exit: bool,
}

impl<A, S, L, P> Daemon<A, S, L, P>
where
    A: DisplayAdapter,
    S: ProfileStorage,
    L: LiveSettings,
    P: ModePublisher,
{
    pub fn new(
        adapter: A,
        machine: StateMachine<S, L, P>,
        debug_override: bool,
        restore_hdmi_on_exit: bool,
    ) -> Self {
        Self {
            adapter,
            machine,
            debug_override,
            restore_hdmi_on_exit,
        }
    }

    /// Establish the initial mode from the hardware
    ///
    /// Fails without touching any settings when the adapter has no composite
    /// connector and the debug override is off.
    pub fn startup(&mut self) -> Result<Mode> {
        let result = scan(&self.adapter);
        ensure_supported(&result, self.debug_override)?;

        let mode = Mode::from_connected(result.connected_composite_output);
        info!(mode = %mode, "Initial output scan complete");
        self.machine.transition(mode)?;
        Ok(mode)
    }

    /// Rescan after a topology change and follow the hardware
    pub fn refresh(&mut self) -> Result<()> {
        let result = scan(&self.adapter);
        if !result.any_composite_output {
            warn!("No composite-capable output in this scan, treating as disconnected");
        }
        self.machine
            .transition(Mode::from_connected(result.connected_composite_output))?;
        Ok(())
    }

    pub fn force_mode(&mut self, mode: Mode) -> Result<()> {
        info!(mode = %mode, "Forcing display mode");
        self.machine.transition(mode)?;
        Ok(())
    }

    /// Follow an edit to a stored profile record
    pub fn reload_profile(&mut self, mode: Mode) -> Result<()> {
        self.machine.reload(mode)?;
        Ok(())
    }

    pub fn reset_profiles(&mut self) -> Result<()> {
        self.machine.reset_profiles()
    }

    /// Final transition before exit so the next session starts from HDMI
    pub fn shutdown(&mut self) -> Result<()> {
        if self.restore_hdmi_on_exit {
            info!("Restoring HDMI settings before exit");
            self.machine.transition(Mode::Hdmi)?;
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Mode> {
        self.machine.current()
    }

    #[cfg(test)]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    #[cfg(test)]
    pub fn machine(&self) -> &StateMachine<S, L, P> {
        &self.machine
    }
}
