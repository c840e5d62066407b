//! Client side of the control surface, used by the `force`, `reset` and
//! `status` subcommands

use anyhow::{Context, Result};
use zbus::proxy;

use crate::constants::dbus::{BUS_NAME, OBJECT_PATH};
use crate::mode::Mode;

#[proxy(interface = "org.CompositeMode.Manager")]
trait Manager {
    fn debug_set_composite_mode(&self, enabled: bool) -> zbus::Result<()>;

    fn debug_reset_settings(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn is_in_composite_mode(&self) -> zbus::Result<bool>;
}

/// Connection to a running daemon
pub struct ControlClient {
    proxy: ManagerProxyBlocking<'static>,
}

impl ControlClient {
    pub fn connect() -> Result<Self> {
        let connection = zbus::blocking::Connection::session()
            .context("Failed to connect to D-Bus session bus")?;
        let proxy = ManagerProxyBlocking::builder(&connection)
            .destination(BUS_NAME)?
            .path(OBJECT_PATH)?
            .build()
            .with_context(|| format!("Failed to reach {BUS_NAME} (is the daemon running?)"))?;
        Ok(Self { proxy })
    }

    pub fn force_mode(&self, mode: Mode) -> Result<()> {
        self.proxy
            .debug_set_composite_mode(mode.is_composite())
            .context("DebugSetCompositeMode call failed")
    }

    pub fn reset_profiles(&self) -> Result<()> {
        self.proxy
            .debug_reset_settings()
            .context("DebugResetSettings call failed")
    }

    pub fn current_mode(&self) -> Result<Mode> {
        let composite = self
            .proxy
            .is_in_composite_mode()
            .context("Failed to read IsInCompositeMode")?;
        Ok(Mode::from_connected(composite))
    }
}
