//! Daemon configuration file
//!
//! Lives at `$XDG_CONFIG_HOME/composite-mode/config.toml` and is created with
//! defaults on first run. The `[[settings]]` tables list what each profile
//! carries; add entries to remember more than the text scaling factor.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{config, desktop};
use crate::settings::{SettingKind, SettingValue, TrackedSetting};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Keep running on hardware without a composite-capable output
    #[serde(default)]
    pub debug: bool,

    /// Switch back to HDMI settings when the daemon exits
    #[serde(default = "default_restore_hdmi_on_exit")]
    pub restore_hdmi_on_exit: bool,

    /// Where profile records are kept; defaults next to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    #[serde(default = "default_settings")]
    pub settings: Vec<TrackedSetting>,
}

fn default_restore_hdmi_on_exit() -> bool {
    true
}

fn default_settings() -> Vec<TrackedSetting> {
    vec![TrackedSetting {
        schema: desktop::INTERFACE_SCHEMA.to_string(),
        key: desktop::TEXT_SCALING_FACTOR.to_string(),
        kind: SettingKind::Double,
        hdmi: None,
        composite: Some(SettingValue::Double(desktop::COMPOSITE_TEXT_SCALING)),
    }]
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            debug: false,
            restore_hdmi_on_exit: default_restore_hdmi_on_exit(),
            state_dir: None,
            settings: default_settings(),
        }
    }
}

impl DaemonConfig {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        path
    }

    /// Load configuration from TOML file or create default
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, creating default config");
            let config = DaemonConfig::default();
            config.save(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: DaemonConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from {}", path.display()))?;

        info!(path = %path.display(), settings = config.settings.len(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Profile directory: explicit setting, else `profiles/` beside the config file
    pub fn profiles_dir(&self, config_path: &Path) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(config::PROFILES_DIR)
        })
    }
}
