//! Test doubles for the display adapter, live settings and publisher

use anyhow::{anyhow, Result};
use std::cell::Cell;
use std::collections::HashMap;

use crate::config::DaemonConfig;
use crate::scanner::{ConnectorType, DisplayAdapter};
use crate::settings::{LiveSettings, SettingKey, SettingKind, SettingValue, TrackedSetting};
use crate::state::ModePublisher;

/// The default tracked setting: text scaling, composite seed 1.1, HDMI from live
pub fn scaling_setting() -> TrackedSetting {
    DaemonConfig::default().settings[0].clone()
}

#[derive(Debug, Default)]
pub struct MemoryLive {
    values: HashMap<SettingKey, SettingValue>,
    pub writes: usize,
    pub resets: usize,
}

impl MemoryLive {
    pub fn with_scaling(scaling: f64) -> Self {
        let mut live = Self::default();
        live.set_scaling(scaling);
        live
    }

    /// Change the value the way a user would, without counting a write
    pub fn set_scaling(&mut self, scaling: f64) {
        self.values
            .insert(scaling_setting().setting_key(), SettingValue::Double(scaling));
    }

    pub fn scaling(&self) -> f64 {
        match self.values.get(&scaling_setting().setting_key()) {
            Some(SettingValue::Double(d)) => *d,
            other => panic!("scaling is not a double: {other:?}"),
        }
    }
}

impl LiveSettings for MemoryLive {
    fn read(&self, key: &SettingKey, kind: SettingKind) -> Result<SettingValue> {
        self.values
            .get(key)
            .cloned()
            .and_then(|value| kind.coerce(value))
            .ok_or_else(|| anyhow!("no live value for {key}"))
    }

    fn write(&mut self, key: &SettingKey, value: &SettingValue) -> Result<()> {
        self.writes += 1;
        self.values.insert(key.clone(), value.clone());
        Ok(())
    }

    fn reset(&mut self, key: &SettingKey) -> Result<()> {
        self.resets += 1;
        self.values.insert(key.clone(), SettingValue::Double(1.0));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingPublisher {
    pub published: Vec<bool>,
}

impl ModePublisher for RecordingPublisher {
    fn publish(&mut self, in_composite_mode: bool) {
        self.published.push(in_composite_mode);
    }
}

#[derive(Debug, Clone)]
pub struct FakeOutput {
    pub connector: ConnectorType,
    pub connected: bool,
    /// Connection status queries fail for this output
    pub fails: bool,
}

impl FakeOutput {
    pub fn named(connector: &str, connected: bool) -> Self {
        Self {
            connector: ConnectorType::Named(connector.to_string()),
            connected,
            fails: false,
        }
    }
}

/// In-memory adapter counting the per-output queries it answers
#[derive(Debug, Default)]
pub struct FakeAdapter {
    pub outputs: Vec<FakeOutput>,
    pub fail_enumeration: bool,
    connector_queries: Cell<usize>,
    connection_queries: Cell<usize>,
}

impl FakeAdapter {
    pub fn new(outputs: Vec<FakeOutput>) -> Self {
        Self {
            outputs,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_enumeration: true,
            ..Self::default()
        }
    }

    pub fn connector_queries(&self) -> usize {
        self.connector_queries.get()
    }

    pub fn connection_queries(&self) -> usize {
        self.connection_queries.get()
    }
}

impl DisplayAdapter for FakeAdapter {
    type Output = usize;

    fn outputs(&self) -> Result<Vec<usize>> {
        if self.fail_enumeration {
            return Err(anyhow!("display server went away"));
        }
        Ok((0..self.outputs.len()).collect())
    }

    fn connector_type(&self, output: usize) -> Result<ConnectorType> {
        self.connector_queries.set(self.connector_queries.get() + 1);
        Ok(self.outputs[output].connector.clone())
    }

    fn is_connected(&self, output: usize) -> Result<bool> {
        self.connection_queries.set(self.connection_queries.get() + 1);
        let output = &self.outputs[output];
        if output.fails {
            return Err(anyhow!("output info request failed"));
        }
        Ok(output.connected)
    }
}
