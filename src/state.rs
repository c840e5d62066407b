//! HDMI / Composite state machine
//!
//! Owns the profile store, the live settings backend and the publisher for
//! the `IsInCompositeMode` property. Every transition saves the outgoing
//! mode's live values before the incoming profile is applied, so switching
//! back and forth never loses a customization.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::persistent::ProfileStorage;
use crate::config::profile::{Profile, ProfileStore};
use crate::mode::Mode;
use crate::settings::LiveSettings;

/// Receives the current mode after each completed transition
pub trait ModePublisher {
    fn publish(&mut self, in_composite_mode: bool);
}

pub struct StateMachine<S, L, P> {
    store: ProfileStore<S>,
    live: L,
    publisher: P,
    current: Option<Mode>,
    /// Profile most recently copied onto the live settings
    applied: Option<Profile>,
}

impl<S, L, P> StateMachine<S, L, P>
where
    S: ProfileStorage,
    L: LiveSettings,
    P: ModePublisher,
{
    pub fn new(store: ProfileStore<S>, live: L, publisher: P) -> Self {
        Self {
            store,
            live,
            publisher,
            current: None,
            applied: None,
        }
    }

    /// `None` until the first transition after startup
    pub fn current(&self) -> Option<Mode> {
        self.current
    }

    /// Switch to `new_mode`; returns false when already there
    pub fn transition(&mut self, new_mode: Mode) -> Result<bool> {
        if self.current == Some(new_mode) {
            debug!(mode = %new_mode, "Already in requested mode");
            return Ok(false);
        }

        let old_mode = self.current;
        if let Some(old_mode) = old_mode {
            let snapshot = Profile::snapshot(self.store.tracked(), &self.live)?;
            self.store.save(old_mode, &snapshot)?;
        }

        let profile = self.store.load(new_mode, &self.live)?;
        self.apply(&profile)?;

        self.current = Some(new_mode);
        self.applied = Some(profile);
        info!(from = ?old_mode, to = %new_mode, "Switched display mode");
        self.publisher.publish(new_mode.is_composite());
        Ok(true)
    }

    /// Copy a profile onto the live settings, writing only values that differ
    fn apply(&mut self, profile: &Profile) -> Result<()> {
        for setting in self.store.tracked() {
            let Some(value) = profile.get(setting) else {
                continue;
            };
            let key = setting.setting_key();
            // Unchanged writes still emit change notifications across the desktop
            if self.live.read(&key, setting.kind)? == *value {
                debug!(setting = %key, "Live value already matches");
                continue;
            }
            self.live.write(&key, value)?;
        }
        Ok(())
    }

    /// Re-apply the current mode's profile after its record changed on disk
    ///
    /// Returns false when `mode` is not current or the stored values match what
    /// was last applied, which covers the daemon's own writes.
    pub fn reload(&mut self, mode: Mode) -> Result<bool> {
        if self.current != Some(mode) {
            debug!(mode = %mode, current = ?self.current, "Ignoring change to inactive profile");
            return Ok(false);
        }

        let profile = self.store.load(mode, &self.live)?;
        if self.applied.as_ref() == Some(&profile) {
            debug!(mode = %mode, "Profile unchanged since last apply");
            return Ok(false);
        }

        self.apply(&profile)?;
        self.applied = Some(profile);
        info!(mode = %mode, "Applied edited profile");
        Ok(true)
    }

    /// Forget both profiles and return the tracked live settings to their defaults
    ///
    /// The current mode is kept; its profile is reseeded on the next visit.
    pub fn reset_profiles(&mut self) -> Result<()> {
        self.store.reset()?;
        self.applied = None;
        for setting in self.store.tracked() {
            self.live.reset(&setting.setting_key())?;
        }
        info!(mode = ?self.current, "Profiles reset");
        Ok(())
    }

    #[cfg(test)]
    pub fn store(&self) -> &ProfileStore<S> {
        &self.store
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut ProfileStore<S> {
        &mut self.store
    }

    #[cfg(test)]
    pub fn live(&self) -> &L {
        &self.live
    }

    #[cfg(test)]
    pub fn live_mut(&mut self) -> &mut L {
        &mut self.live
    }

    #[cfg(test)]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}
