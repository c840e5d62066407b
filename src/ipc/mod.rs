//! D-Bus control surface
//!
//! Serves `org.CompositeMode.Manager` on the session bus. Method calls only
//! enqueue a [`Command`] for the dispatcher and return, so callers never see
//! an error and never wait on a transition.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{info, warn};
use zbus::blocking::connection;
use zbus::interface;

mod client;
mod messages;
pub use client::ControlClient;
pub use messages::Command;

use crate::constants::dbus::{BUS_NAME, INTERFACE, OBJECT_PATH};
use crate::state::ModePublisher;

/// Object served at [`OBJECT_PATH`]
pub struct ControlSurface {
    commands: Sender<Command>,
    in_composite_mode: Arc<AtomicBool>,
}

impl ControlSurface {
    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!(command = ?command, "Dispatcher is gone, dropping D-Bus request");
        }
    }
}

#[interface(name = "org.CompositeMode.Manager")]
impl ControlSurface {
    /// Force composite (true) or HDMI (false) mode regardless of the hardware
    fn debug_set_composite_mode(&self, enabled: bool) {
        info!(enabled = enabled, "DebugSetCompositeMode requested");
        self.send(Command::ForceMode(enabled));
    }

    /// Forget both stored profiles
    fn debug_reset_settings(&self) {
        info!("DebugResetSettings requested");
        self.send(Command::ResetProfiles);
    }

    #[zbus(property)]
    fn is_in_composite_mode(&self) -> bool {
        self.in_composite_mode.load(Ordering::SeqCst)
    }
}

/// Claim the bus name and export the control surface
///
/// The returned publisher keeps the connection alive; drop it to leave the bus.
pub fn serve(commands: Sender<Command>) -> Result<DbusPublisher> {
    let in_composite_mode = Arc::new(AtomicBool::new(false));
    let surface = ControlSurface {
        commands,
        in_composite_mode: Arc::clone(&in_composite_mode),
    };

    let connection = connection::Builder::session()
        .context("Failed to connect to D-Bus session bus")?
        .name(BUS_NAME)
        .context("Invalid D-Bus bus name")?
        .serve_at(OBJECT_PATH, surface)
        .context("Failed to export control surface")?
        .build()
        .with_context(|| format!("Failed to claim {BUS_NAME} on the session bus"))?;

    info!(name = BUS_NAME, path = OBJECT_PATH, interface = INTERFACE, "Control surface exported");
    Ok(DbusPublisher {
        connection,
        in_composite_mode,
    })
}

/// Publishes `IsInCompositeMode` and announces each change
pub struct DbusPublisher {
    connection: zbus::blocking::Connection,
    in_composite_mode: Arc<AtomicBool>,
}

impl DbusPublisher {
    fn emit_changed(&self) -> zbus::Result<()> {
        let iface_ref = self
            .connection
            .object_server()
            .interface::<_, ControlSurface>(OBJECT_PATH)?;
        let iface = iface_ref.get();
        zbus::block_on(iface.is_in_composite_mode_changed(iface_ref.signal_emitter()))
    }
}

impl ModePublisher for DbusPublisher {
    fn publish(&mut self, in_composite_mode: bool) {
        self.in_composite_mode.store(in_composite_mode, Ordering::SeqCst);
        if let Err(e) = self.emit_changed() {
            warn!(error = %e, "Failed to announce IsInCompositeMode change");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_methods_enqueue_commands() {
        let (tx, rx) = mpsc::channel();
        let surface = ControlSurface {
            commands: tx,
            in_composite_mode: Arc::new(AtomicBool::new(false)),
        };

        surface.debug_set_composite_mode(true);
        surface.debug_reset_settings();
        surface.debug_set_composite_mode(false);

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![Command::ForceMode(true), Command::ResetProfiles, Command::ForceMode(false)]
        );
    }

    #[test]
    fn test_property_reads_shared_flag() {
        let (tx, _rx) = mpsc::channel();
        let flag = Arc::new(AtomicBool::new(false));
        let surface = ControlSurface {
            commands: tx,
            in_composite_mode: Arc::clone(&flag),
        };

        assert!(!surface.is_in_composite_mode());
        flag.store(true, Ordering::SeqCst);
        assert!(surface.is_in_composite_mode());
    }

    #[test]
    fn test_closed_dispatcher_is_not_an_error() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let surface = ControlSurface {
            commands: tx,
            in_composite_mode: Arc::new(AtomicBool::new(false)),
        };
        surface.debug_reset_settings();
    }
}
