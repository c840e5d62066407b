//! Durable storage for per-mode profile records
//!
//! One TOML file per mode under the profiles directory. Writes go through a
//! temporary file and a rename so a record is never observed half-written.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::mode::Mode;
use crate::settings::SettingValue;

/// Stored state of one mode's profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub initialized: bool,

    /// Setting id → value
    #[serde(default)]
    pub values: BTreeMap<String, SettingValue>,
}

/// Backend holding one record per mode
pub trait ProfileStorage {
    /// Read a mode's record; a record that was never written reads as default
    fn read(&self, mode: Mode) -> Result<ProfileRecord>;

    fn write(&mut self, mode: Mode, record: &ProfileRecord) -> Result<()>;

    /// Drop a mode's record entirely
    fn clear(&mut self, mode: Mode) -> Result<()>;
}

/// TOML files in a directory: `<dir>/hdmi.toml`, `<dir>/composite.toml`
#[derive(Debug, Clone)]
pub struct TomlStorage {
    dir: PathBuf,
}

impl TomlStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, mode: Mode) -> PathBuf {
        self.dir.join(record_file_name(mode))
    }

    /// Mode whose record lives at `path`, judged by file name
    pub fn mode_for_path(path: &Path) -> Option<Mode> {
        let name = path.file_name()?.to_str()?;
        Mode::ALL.into_iter().find(|&mode| record_file_name(mode) == name)
    }
}

fn record_file_name(mode: Mode) -> String {
    format!("{}.toml", mode.as_str())
}

impl ProfileStorage for TomlStorage {
    fn read(&self, mode: Mode) -> Result<ProfileRecord> {
        let path = self.record_path(mode);
        if !path.exists() {
            debug!(mode = %mode, path = %path.display(), "No profile record yet");
            return Ok(ProfileRecord::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read profile from {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse profile TOML from {}", path.display()))
    }

    fn write(&mut self, mode: Mode, record: &ProfileRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create profile directory {}", self.dir.display()))?;

        let path = self.record_path(mode);
        let tmp = path.with_extension("toml.tmp");
        let contents = toml::to_string_pretty(record)
            .context("Failed to serialize profile to TOML")?;
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("Failed to create {}", tmp.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write profile to {}", tmp.display()))?;
        // Contents must be on disk before the rename makes them visible
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", tmp.display()))?;
        drop(file);
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move profile into place at {}", path.display()))?;

        debug!(mode = %mode, path = %path.display(), initialized = record.initialized, "Saved profile record");
        Ok(())
    }

    fn clear(&mut self, mode: Mode) -> Result<()> {
        let path = self.record_path(mode);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove profile {}", path.display()))?;
            info!(mode = %mode, path = %path.display(), "Removed profile record");
        }
        Ok(())
    }
}
