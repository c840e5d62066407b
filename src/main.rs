#![forbid(unsafe_code)]

mod cli;
mod config;
mod constants;
mod daemon;
mod error;
mod event_handler;
mod ipc;
mod mode;
mod profile_watcher;
mod scanner;
mod settings;
#[cfg(unix)]
mod signals;
mod state;
#[cfg(test)]
mod testing;
mod x11_utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::mpsc;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;
use x11rb::connection::Connection;

use cli::{Args, Cmd};
use config::{DaemonConfig, ProfileStore, TomlStorage};
use constants::env;
use daemon::Daemon;
use ipc::ControlClient;
use settings::GsettingsLive;
use state::StateMachine;
use x11_utils::{require_randr, CachedAtoms, RandrAdapter};

fn init_logging() -> Result<()> {
    let log_level = match std::env::var(env::LOG_LEVEL)
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

fn run_daemon(args: &Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(DaemonConfig::default_path);
    let mut config = DaemonConfig::load(&config_path)?;
    if let Some(dir) = &args.state_dir {
        config.state_dir = Some(dir.clone());
    }
    let debug_override =
        args.debug || config.debug || std::env::var_os(env::DEBUG_OVERRIDE).is_some();

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11")?;
    require_randr(&conn)?;
    let screen = &conn.setup().roots[screen_num];
    info!(screen = screen_num, root = screen.root, "Successfully connected to X11");
    let atoms = CachedAtoms::new(&conn)?;

    let (command_tx, command_rx) = mpsc::channel();
    let publisher = ipc::serve(command_tx.clone())?;
    #[cfg(unix)]
    let _signal_handle = signals::spawn_listener(command_tx.clone())?;

    let profiles_dir = config.profiles_dir(&config_path);
    let storage = TomlStorage::new(&profiles_dir);
    info!(dir = %storage.dir().display(), settings = config.settings.len(), "Using profile directory");
    let machine = StateMachine::new(
        ProfileStore::new(storage, config.settings.clone()),
        GsettingsLive::new(),
        publisher,
    );
    let adapter = RandrAdapter {
        conn: &conn,
        root: screen.root,
        atoms: &atoms,
    };
    let mut daemon = Daemon::new(adapter, machine, debug_override, config.restore_hdmi_on_exit);

    // Select RandR input before the first scan so no hotplug falls in between
    let _monitor_handle = event_handler::spawn_topology_monitor(command_tx.clone())?;
    daemon.startup()?;
    let _profile_watcher = profile_watcher::spawn_profile_watcher(&profiles_dir, command_tx)?;

    event_handler::run(&mut daemon, &command_rx)
}

fn main() -> Result<()> {
    init_logging()?;
    let args = Args::parse();

    match &args.command {
        None | Some(Cmd::Daemon) => run_daemon(&args),
        Some(Cmd::Force { mode }) => ControlClient::connect()?.force_mode(*mode),
        Some(Cmd::Reset) => ControlClient::connect()?.reset_profiles(),
        Some(Cmd::Status) => {
            let mode = ControlClient::connect()?.current_mode()?;
            println!("{mode}");
            Ok(())
        }
    }
}
