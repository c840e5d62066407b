use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::info;

use crate::ipc::Command;

/// Spawn a background thread turning SIGINT/SIGTERM into [`Command::Shutdown`]
pub fn spawn_listener(sender: Sender<Command>) -> Result<thread::JoinHandle<()>> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;

    Ok(thread::spawn(move || {
        for signal in signals.forever() {
            info!(signal = signal, "Termination signal received");
            if sender.send(Command::Shutdown).is_err() {
                break;
            }
        }
    }))
}
