//! Composite output detection
//!
//! Walks the adapter's current output list and reports whether a composite
//! connector exists and whether one is plugged in. Hardware query failures
//! never escape: they degrade to the conservative "not connected" answer.

use anyhow::Result;
use tracing::{debug, warn};

use crate::constants::x11::TV_COMPOSITE;
use crate::error::DaemonError;

/// Connector type as read from an output property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorType {
    Named(String),
    /// Property missing, or of unexpected type, format or length
    Malformed,
}

impl ConnectorType {
    pub fn is_composite(&self) -> bool {
        matches!(self, ConnectorType::Named(name) if name == TV_COMPOSITE)
    }
}

/// Read-only view of a display adapter's outputs
pub trait DisplayAdapter {
    type Output: Copy + std::fmt::Debug;

    /// Point-in-time snapshot of the adapter's outputs
    fn outputs(&self) -> Result<Vec<Self::Output>>;

    fn connector_type(&self, output: Self::Output) -> Result<ConnectorType>;

    fn is_connected(&self, output: Self::Output) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub any_composite_output: bool,
    pub connected_composite_output: bool,
}

pub fn scan<A: DisplayAdapter>(adapter: &A) -> ScanResult {
    let mut result = ScanResult::default();

    let outputs = match adapter.outputs() {
        Ok(outputs) => outputs,
        Err(e) => {
            warn!(error = %e, "Failed to list outputs, assuming no composite output is connected");
            return result;
        }
    };
    if outputs.is_empty() {
        warn!("Display adapter reported no outputs");
    }

    for output in outputs {
        let connector = adapter.connector_type(output).unwrap_or_else(|e| {
            debug!(output = ?output, error = %e, "Failed to read connector type");
            ConnectorType::Malformed
        });
        debug!(output = ?output, connector = ?connector, "Classified output");
        if !connector.is_composite() {
            continue;
        }

        result.any_composite_output = true;
        match adapter.is_connected(output) {
            Ok(true) => {
                result.connected_composite_output = true;
                break;
            }
            Ok(false) => {}
            Err(e) => warn!(output = ?output, error = %e, "Failed to query connection status"),
        }
    }

    debug!(
        any = result.any_composite_output,
        connected = result.connected_composite_output,
        "Output scan finished"
    );
    result
}

/// Startup capability check: the hardware must have a composite connector
pub fn ensure_supported(result: &ScanResult, debug_override: bool) -> Result<(), DaemonError> {
    if result.any_composite_output {
        return Ok(());
    }
    if debug_override {
        warn!("No composite-capable output found, continuing because the debug override is set");
        return Ok(());
    }
    Err(DaemonError::NoCompositeOutput)
}
