//! Configuration and profile persistence
//!
//! - **daemon**: the daemon's own TOML configuration (tracked settings, flags)
//! - **persistent**: durable per-mode profile records
//! - **profile**: load/save/reset protocol over those records

pub mod daemon;
pub mod persistent;
pub mod profile;

// Re-export commonly used types
pub use daemon::DaemonConfig;
pub use persistent::TomlStorage;
pub use profile::ProfileStore;
