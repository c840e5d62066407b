//! Desktop settings model
//!
//! A profile carries a configurable list of tracked settings. Each one is
//! addressed by schema + key, has a declared value kind, and optionally a
//! per-mode seed used the first time that mode's profile is loaded.

mod gsettings;

pub use gsettings::GsettingsLive;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mode::Mode;

/// Address of a single desktop setting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SettingKey {
    pub schema: String,
    pub key: String,
}

impl SettingKey {
    pub fn new(schema: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            key: key.into(),
        }
    }

    /// Identifier used inside profile records
    pub fn id(&self) -> String {
        format!("{}.{}", self.schema, self.key)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.schema, self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    Bool,
    Int,
    Double,
    String,
}

/// A typed setting value
///
/// Untagged so profile files read naturally (`"...text-scaling-factor" = 1.1`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

impl SettingKind {
    /// Convert a stored value into this kind, if it is representable
    pub fn coerce(self, value: SettingValue) -> Option<SettingValue> {
        match (self, value) {
            (SettingKind::Bool, v @ SettingValue::Bool(_)) => Some(v),
            (SettingKind::Int, v @ SettingValue::Int(_)) => Some(v),
            (SettingKind::Double, v @ SettingValue::Double(_)) => Some(v),
            (SettingKind::Double, SettingValue::Int(i)) => Some(SettingValue::Double(i as f64)),
            (SettingKind::String, v @ SettingValue::Text(_)) => Some(v),
            _ => None,
        }
    }
}

/// One setting carried by both profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedSetting {
    pub schema: String,
    pub key: String,
    pub kind: SettingKind,

    /// Seed for the HDMI profile; absent means "adopt the live value"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdmi: Option<SettingValue>,

    /// Seed for the Composite profile; absent means "adopt the live value"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<SettingValue>,
}

impl TrackedSetting {
    pub fn setting_key(&self) -> SettingKey {
        SettingKey::new(&self.schema, &self.key)
    }

    pub fn seed(&self, mode: Mode) -> Option<&SettingValue> {
        match mode {
            Mode::Hdmi => self.hdmi.as_ref(),
            Mode::Composite => self.composite.as_ref(),
        }
    }
}

/// The desktop-wide settings surface the active profile is applied to
pub trait LiveSettings {
    fn read(&self, key: &SettingKey, kind: SettingKind) -> Result<SettingValue>;

    fn write(&mut self, key: &SettingKey, value: &SettingValue) -> Result<()>;

    /// Return the key to its schema default
    fn reset(&mut self, key: &SettingKey) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int_into_double() {
        assert_eq!(
            SettingKind::Double.coerce(SettingValue::Int(2)),
            Some(SettingValue::Double(2.0))
        );
        assert_eq!(SettingKind::Bool.coerce(SettingValue::Int(1)), None);
        assert_eq!(
            SettingKind::String.coerce(SettingValue::Text("zoom".into())),
            Some(SettingValue::Text("zoom".into()))
        );
    }

    #[test]
    fn test_tracked_setting_from_toml() {
        let setting: TrackedSetting = toml::from_str(
            r#"
            schema = "org.gnome.desktop.background"
            key = "picture-options"
            kind = "string"
            composite = "scaled"
            "#,
        )
        .unwrap();

        assert_eq!(setting.seed(Mode::Hdmi), None);
        assert_eq!(
            setting.seed(Mode::Composite),
            Some(&SettingValue::Text("scaled".into()))
        );
        assert_eq!(setting.setting_key().id(), "org.gnome.desktop.background.picture-options");
    }
}
