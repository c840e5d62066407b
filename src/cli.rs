use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::mode::Mode;

/// Switch desktop settings between HDMI and composite-video profiles
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Cmd>,

    /// Configuration file (default: $XDG_CONFIG_HOME/composite-mode/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the per-mode profile records
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Keep running even if no composite-capable output exists
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Run the background service (default)
    Daemon,

    /// Ask the running daemon to switch modes regardless of the hardware
    Force {
        #[arg(value_name = "hdmi|composite")]
        mode: Mode,
    },

    /// Ask the running daemon to forget both profiles
    Reset,

    /// Print the running daemon's current mode
    Status,
}
