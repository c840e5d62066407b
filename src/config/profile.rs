//! Per-mode profiles and the first-use seeding protocol
//!
//! A profile is the set of tracked setting values remembered for one mode.
//! Loading an uninitialized profile seeds it: configured defaults where the
//! mode has one, the current desktop value otherwise. Seeded values are
//! committed before the `initialized` flag, so an interrupted seed never
//! overwrites values a later load already finds stored.

use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::persistent::ProfileStorage;
use crate::mode::Mode;
use crate::settings::{LiveSettings, SettingValue, TrackedSetting};

/// Values of the tracked settings for one mode, keyed by setting id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub values: BTreeMap<String, SettingValue>,
}

impl Profile {
    pub fn get(&self, setting: &TrackedSetting) -> Option<&SettingValue> {
        self.values.get(&setting.setting_key().id())
    }

    /// Capture the current desktop values of every tracked setting
    pub fn snapshot(tracked: &[TrackedSetting], live: &dyn LiveSettings) -> Result<Self> {
        let mut values = BTreeMap::new();
        for setting in tracked {
            let key = setting.setting_key();
            values.insert(key.id(), live.read(&key, setting.kind)?);
        }
        Ok(Self { values })
    }
}

/// Typed access to the per-mode profile records
pub struct ProfileStore<S> {
    storage: S,
    tracked: Vec<TrackedSetting>,
}

impl<S: ProfileStorage> ProfileStore<S> {
    pub fn new(storage: S, tracked: Vec<TrackedSetting>) -> Self {
        Self { storage, tracked }
    }

    pub fn tracked(&self) -> &[TrackedSetting] {
        &self.tracked
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load a mode's profile, seeding any tracked setting it has no value for
    pub fn load(&mut self, mode: Mode, live: &dyn LiveSettings) -> Result<Profile> {
        let mut record = self.storage.read(mode)?;

        let mut values = BTreeMap::new();
        let mut seeded = Vec::new();
        for setting in &self.tracked {
            let id = setting.setting_key().id();
            let stored = record
                .values
                .get(&id)
                .cloned()
                .and_then(|value| {
                    let coerced = setting.kind.coerce(value.clone());
                    if coerced.is_none() {
                        warn!(mode = %mode, setting = %id, value = ?value, "Stored value has the wrong kind, reseeding");
                    }
                    coerced
                });

            let value = match stored {
                Some(value) => value,
                None => {
                    let value = match setting.seed(mode) {
                        Some(seed) => seed.clone(),
                        None => live.read(&setting.setting_key(), setting.kind)?,
                    };
                    seeded.push(id.clone());
                    value
                }
            };
            values.insert(id, value);
        }

        if !seeded.is_empty() || !record.initialized {
            info!(mode = %mode, seeded = ?seeded, "Seeding profile defaults");
            record.values.extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
            self.storage.write(mode, &record)?;

            if !record.initialized {
                record.initialized = true;
                self.storage.write(mode, &record)?;
            }
        }

        debug!(mode = %mode, values = ?values, "Loaded profile");
        Ok(Profile { values })
    }

    /// Overwrite a mode's stored values, leaving its `initialized` flag alone
    pub fn save(&mut self, mode: Mode, profile: &Profile) -> Result<()> {
        let mut record = self.storage.read(mode)?;
        record
            .values
            .extend(profile.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.storage.write(mode, &record)?;
        debug!(mode = %mode, values = ?profile.values, "Saved profile");
        Ok(())
    }

    /// Forget every profile; the next load of each mode seeds it again
    pub fn reset(&mut self) -> Result<()> {
        for mode in Mode::ALL {
            self.storage.clear(mode)?;
        }
        info!("Reset all profiles");
        Ok(())
    }

    #[cfg(test)]
    pub fn is_initialized(&self, mode: Mode) -> Result<bool> {
        Ok(self.storage.read(mode)?.initialized)
    }
}
