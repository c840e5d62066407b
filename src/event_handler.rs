use anyhow::{Context, Result};
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::randr;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::config::persistent::ProfileStorage;
use crate::daemon::Daemon;
use crate::ipc::Command;
use crate::mode::Mode;
use crate::scanner::DisplayAdapter;
use crate::settings::LiveSettings;
use crate::state::ModePublisher;
use crate::x11_utils::{require_randr, select_topology_events};

/// Watch RandR notifications on a dedicated connection
///
/// Each relevant event becomes a [`Command::TopologyChanged`]. When the X
/// connection breaks the thread asks the dispatcher to shut down.
pub fn spawn_topology_monitor(sender: Sender<Command>) -> Result<thread::JoinHandle<()>> {
    let (conn, screen_num) =
        x11rb::connect(None).context("Failed to open X11 connection for RandR events")?;
    require_randr(&conn)?;
    let root = conn.setup().roots[screen_num].root;
    select_topology_events(&conn, root)?;
    info!(screen = screen_num, "Listening for display topology changes");

    Ok(thread::spawn(move || {
        if let Err(e) = watch_topology(&conn, &sender) {
            error!(error = %e, "Topology monitor stopped");
        }
        let _ = sender.send(Command::Shutdown);
    }))
}

fn watch_topology(conn: &RustConnection, sender: &Sender<Command>) -> Result<()> {
    loop {
        let event = conn
            .wait_for_event()
            .context("Lost X11 connection while waiting for RandR events")?;
        match event {
            Event::RandrScreenChangeNotify(_) => debug!("RandR screen change"),
            Event::RandrNotify(event) if event.sub_code == randr::Notify::OUTPUT_CHANGE => {
                debug!("RandR output change")
            }
            _ => continue,
        }
        if sender.send(Command::TopologyChanged).is_err() {
            // Dispatcher already exited
            return Ok(());
        }
    }
}

pub fn handle_command<A, S, L, P>(
    daemon: &mut Daemon<A, S, L, P>,
    command: Command,
) -> Result<ControlFlow<()>>
where
    A: DisplayAdapter,
    S: ProfileStorage,
    L: LiveSettings,
    P: ModePublisher,
{
    match command {
        Command::TopologyChanged => daemon.refresh()?,
        Command::ForceMode(enabled) => daemon.force_mode(Mode::from_connected(enabled))?,
        Command::ProfileChanged(mode) => {
            // A hand-edited record may be mid-write or invalid; wait for the next change
            if let Err(e) = daemon.reload_profile(mode) {
                warn!(mode = %mode, error = %e, "Failed to apply edited profile");
            }
        }
        Command::ResetProfiles => daemon.reset_profiles()?,
        Command::Shutdown => {
            daemon.shutdown()?;
            return Ok(ControlFlow::Break(()));
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Serve commands one at a time until shutdown
///
/// Runs on the thread owning the daemon, so transitions never overlap.
/// Bursts of topology or profile events collapse into a single pass.
pub fn run<A, S, L, P>(daemon: &mut Daemon<A, S, L, P>, commands: &Receiver<Command>) -> Result<()>
where
    A: DisplayAdapter,
    S: ProfileStorage,
    L: LiveSettings,
    P: ModePublisher,
{
    let mut pending = None;
    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => commands.recv().unwrap_or_else(|_| {
                warn!("All command senders dropped, shutting down");
                Command::Shutdown
            }),
        };

        if command.coalesces() {
            let mut coalesced = 0;
            loop {
                match commands.try_recv() {
                    Ok(next) if next == command => coalesced += 1,
                    Ok(other) => {
                        pending = Some(other);
                        break;
                    }
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
            if coalesced > 0 {
                debug!(command = ?command, coalesced = coalesced, "Coalesced repeated commands");
            }
        }

        debug!(command = ?command, "Handling command");
        if handle_command(daemon, command)?.is_break() {
            info!(mode = ?daemon.current(), "Dispatcher stopped");
            return Ok(());
        }
    }
}
