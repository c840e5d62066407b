//! Live settings backed by the `gsettings` command-line tool

use anyhow::{anyhow, Context, Result};
use std::process::Command;
use tracing::debug;

use super::{LiveSettings, SettingKey, SettingKind, SettingValue};
use crate::constants::desktop::GSETTINGS_BIN;
use crate::error::DaemonError;

/// Reads and writes the dconf-backed GSettings database
#[derive(Debug, Clone)]
pub struct GsettingsLive {
    program: String,
}

impl Default for GsettingsLive {
    fn default() -> Self {
        Self {
            program: GSETTINGS_BIN.to_string(),
        }
    }
}

impl GsettingsLive {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to run {} {}", self.program, args.join(" ")))?;
        if !output.status.success() {
            return Err(anyhow!(
                "{} {} failed: {}",
                self.program,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl LiveSettings for GsettingsLive {
    fn read(&self, key: &SettingKey, kind: SettingKind) -> Result<SettingValue> {
        let raw = self.run(&["get", &key.schema, &key.key])?;
        parse_variant(&raw, kind).ok_or_else(|| {
            DaemonError::MalformedSetting {
                key: key.to_string(),
                raw,
            }
            .into()
        })
    }

    fn write(&mut self, key: &SettingKey, value: &SettingValue) -> Result<()> {
        let text = format_variant(value);
        debug!(setting = %key, value = %text, "gsettings set");
        self.run(&["set", &key.schema, &key.key, &text]).map(|_| ())
    }

    fn reset(&mut self, key: &SettingKey) -> Result<()> {
        debug!(setting = %key, "gsettings reset");
        self.run(&["reset", &key.schema, &key.key]).map(|_| ())
    }
}

/// Parse GVariant text as printed by `gsettings get`
fn parse_variant(raw: &str, kind: SettingKind) -> Option<SettingValue> {
    // Non-default integer widths carry a type prefix ("uint32 5")
    let last = raw.rsplit(' ').next().unwrap_or(raw);
    match kind {
        SettingKind::Bool => last.parse().ok().map(SettingValue::Bool),
        SettingKind::Int => last.parse().ok().map(SettingValue::Int),
        SettingKind::Double => last.parse().ok().map(SettingValue::Double),
        SettingKind::String => {
            let inner = raw
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .or_else(|| raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')))?;
            Some(SettingValue::Text(inner.replace("\\'", "'").replace("\\\\", "\\")))
        }
    }
}

fn format_variant(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(b) => b.to_string(),
        SettingValue::Int(i) => i.to_string(),
        // Debug keeps the decimal point so GVariant parses a double
        SettingValue::Double(d) => format!("{d:?}"),
        SettingValue::Text(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_double() {
        assert_eq!(
            parse_variant("1.1000000000000001", SettingKind::Double),
            Some(SettingValue::Double(1.1000000000000001))
        );
        assert_eq!(parse_variant("1.0", SettingKind::Double), Some(SettingValue::Double(1.0)));
    }

    #[test]
    fn test_parse_prefixed_integer() {
        assert_eq!(parse_variant("uint32 300", SettingKind::Int), Some(SettingValue::Int(300)));
        assert_eq!(parse_variant("12", SettingKind::Int), Some(SettingValue::Int(12)));
    }

    #[test]
    fn test_parse_string_unescapes_quotes() {
        assert_eq!(
            parse_variant("'zoom'", SettingKind::String),
            Some(SettingValue::Text("zoom".into()))
        );
        assert_eq!(
            parse_variant(r"'it\'s'", SettingKind::String),
            Some(SettingValue::Text("it's".into()))
        );
        assert_eq!(parse_variant("zoom", SettingKind::String), None);
    }

    #[test]
    fn test_parse_rejects_wrong_kind() {
        assert_eq!(parse_variant("'zoom'", SettingKind::Double), None);
        assert_eq!(parse_variant("maybe", SettingKind::Bool), None);
    }

    #[test]
    fn test_format_variant() {
        assert_eq!(format_variant(&SettingValue::Double(1.0)), "1.0");
        assert_eq!(format_variant(&SettingValue::Double(1.1)), "1.1");
        assert_eq!(format_variant(&SettingValue::Bool(true)), "true");
        assert_eq!(format_variant(&SettingValue::Text("#023c88".into())), "'#023c88'");
        assert_eq!(format_variant(&SettingValue::Text("it's".into())), r"'it\'s'");
    }
}
