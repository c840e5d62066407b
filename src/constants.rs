//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// X11 / RandR protocol constants
pub mod x11 {
    /// RandR output property holding the connector type atom
    pub const CONNECTOR_TYPE_PROPERTY: &str = "ConnectorType";

    /// Connector type value reported by analog composite outputs
    pub const TV_COMPOSITE: &str = "TV-Composite";

    /// Property format for 32-bit atom lists
    pub const ATOM_FORMAT: u8 = 32;

    /// Minimum RandR version needed for GetScreenResourcesCurrent
    pub const RANDR_MAJOR: u32 = 1;
    pub const RANDR_MINOR: u32 = 3;
}

/// D-Bus control surface names
pub mod dbus {
    /// Well-known bus name claimed by the daemon
    pub const BUS_NAME: &str = "org.CompositeMode";

    /// Object path the manager interface is served at
    pub const OBJECT_PATH: &str = "/org/CompositeMode";

    /// Manager interface name
    pub const INTERFACE: &str = "org.CompositeMode.Manager";
}

/// Environment variables read at startup
pub mod env {
    /// When set (to any value), the daemon keeps running on hardware without
    /// a composite-capable output
    pub const DEBUG_OVERRIDE: &str = "COMPOSITE_MODE_DEBUG";

    /// Log level filter (trace, debug, info, warn, error)
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Configuration file locations
pub mod config {
    /// Directory under the XDG config dir
    pub const APP_DIR: &str = "composite-mode";

    /// Daemon configuration file name
    pub const FILENAME: &str = "config.toml";

    /// Subdirectory holding one record per mode
    pub const PROFILES_DIR: &str = "profiles";
}

/// Live desktop settings defaults
pub mod desktop {
    /// GNOME interface schema
    pub const INTERFACE_SCHEMA: &str = "org.gnome.desktop.interface";

    /// Text scaling factor key in the interface schema
    pub const TEXT_SCALING_FACTOR: &str = "text-scaling-factor";

    /// Text scaling used the first time composite mode is entered
    pub const COMPOSITE_TEXT_SCALING: f64 = 1.1;

    /// CLI used to reach the GSettings database
    pub const GSETTINGS_BIN: &str = "gsettings";
}
