use anyhow::{Context, Result};
use tracing::{debug, info};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::randr::{self, ConnectionExt as RandrExt};
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::constants::x11;
use crate::error::DaemonError;
use crate::scanner::{ConnectorType, DisplayAdapter};

/// Pre-cached X11 atoms to avoid repeated roundtrips
pub struct CachedAtoms {
    pub connector_type: Atom,
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        Ok(Self {
            connector_type: conn
                .intern_atom(false, x11::CONNECTOR_TYPE_PROPERTY.as_bytes())
                .context("Failed to intern ConnectorType atom")?
                .reply()
                .context("Failed to get reply for ConnectorType atom")?
                .atom,
        })
    }
}

/// Fail unless the server speaks a RandR version with GetScreenResourcesCurrent
pub fn require_randr(conn: &RustConnection) -> Result<()> {
    let unavailable = DaemonError::RandrUnavailable {
        major: x11::RANDR_MAJOR,
        minor: x11::RANDR_MINOR,
    };
    if conn
        .extension_information(randr::X11_EXTENSION_NAME)
        .context("Failed to query RandR extension")?
        .is_none()
    {
        return Err(unavailable.into());
    }

    let version = conn
        .randr_query_version(x11::RANDR_MAJOR, x11::RANDR_MINOR)
        .context("Failed to query RandR version")?
        .reply()
        .context("Failed to get reply for RandR version query")?;
    info!(major = version.major_version, minor = version.minor_version, "RandR available");

    if (version.major_version, version.minor_version) < (x11::RANDR_MAJOR, x11::RANDR_MINOR) {
        return Err(unavailable.into());
    }
    Ok(())
}

/// Ask for RandR notifications whenever outputs or the screen layout change
pub fn select_topology_events(conn: &RustConnection, root: Window) -> Result<()> {
    conn.randr_select_input(
        root,
        randr::NotifyMask::SCREEN_CHANGE | randr::NotifyMask::OUTPUT_CHANGE,
    )
    .context("Failed to select RandR input on root window")?;
    conn.flush().context("Failed to flush X11 connection after selecting RandR input")?;
    Ok(())
}

/// The atom held by a ConnectorType property reply
///
/// `None` unless the reply is a single 32-bit ATOM value.
fn connector_atom(type_: Atom, format: u8, num_items: u32, data: &[u8]) -> Option<Atom> {
    if type_ != u32::from(AtomEnum::ATOM) || format != x11::ATOM_FORMAT || num_items < 1 {
        return None;
    }
    let bytes: [u8; 4] = data.get(0..4)?.try_into().ok()?;
    Some(u32::from_ne_bytes(bytes))
}

/// Output handle valid for the resource snapshot it came from
#[derive(Debug, Clone, Copy)]
pub struct RandrOutput {
    pub id: randr::Output,
    pub config_timestamp: Timestamp,
}

/// The X screen's RandR outputs, queried fresh on every call
pub struct RandrAdapter<'a> {
    pub conn: &'a RustConnection,
    pub root: Window,
    pub atoms: &'a CachedAtoms,
}

impl DisplayAdapter for RandrAdapter<'_> {
    type Output = RandrOutput;

    fn outputs(&self) -> Result<Vec<RandrOutput>> {
        let resources = self
            .conn
            .randr_get_screen_resources_current(self.root)
            .context("Failed to query RandR screen resources")?
            .reply()
            .context("Failed to get reply for RandR screen resources")?;
        debug!(count = resources.outputs.len(), "Fetched RandR outputs");
        Ok(resources
            .outputs
            .iter()
            .map(|&id| RandrOutput {
                id,
                config_timestamp: resources.config_timestamp,
            })
            .collect())
    }

    fn connector_type(&self, output: RandrOutput) -> Result<ConnectorType> {
        let prop = self
            .conn
            .randr_get_output_property(
                output.id,
                self.atoms.connector_type,
                AtomEnum::ATOM,
                0,
                1,
                false,
                false,
            )
            .context(format!("Failed to query ConnectorType for output {}", output.id))?
            .reply()
            .context(format!("Failed to get ConnectorType reply for output {}", output.id))?;

        let Some(atom) = connector_atom(prop.type_, prop.format, prop.num_items, &prop.data) else {
            return Ok(ConnectorType::Malformed);
        };

        let name = self
            .conn
            .get_atom_name(atom)
            .context(format!("Failed to query name of atom {}", atom))?
            .reply()
            .context(format!("Failed to get name reply for atom {}", atom))?
            .name;
        Ok(ConnectorType::Named(String::from_utf8_lossy(&name).into_owned()))
    }

    fn is_connected(&self, output: RandrOutput) -> Result<bool> {
        let info = self
            .conn
            .randr_get_output_info(output.id, output.config_timestamp)
            .context(format!("Failed to query info for output {}", output.id))?
            .reply()
            .context(format!("Failed to get info reply for output {}", output.id))?;
        debug!(
            output = output.id,
            name = %String::from_utf8_lossy(&info.name),
            connection = ?info.connection,
            "Output connection status"
        );
        Ok(info.connection == randr::Connection::CONNECTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM: Atom = 0x2a1;

    fn atom_data() -> Vec<u8> {
        ATOM.to_ne_bytes().to_vec()
    }

    #[test]
    fn test_connector_atom_accepts_single_atom() {
        let atom_type = u32::from(AtomEnum::ATOM);
        assert_eq!(connector_atom(atom_type, 32, 1, &atom_data()), Some(ATOM));
    }

    #[test]
    fn test_connector_atom_rejects_wrong_type() {
        let string_type = u32::from(AtomEnum::STRING);
        assert_eq!(connector_atom(string_type, 32, 1, &atom_data()), None);
    }

    #[test]
    fn test_connector_atom_rejects_wrong_format() {
        let atom_type = u32::from(AtomEnum::ATOM);
        assert_eq!(connector_atom(atom_type, 8, 4, &atom_data()), None);
    }

    #[test]
    fn test_connector_atom_rejects_empty_reply() {
        let atom_type = u32::from(AtomEnum::ATOM);
        assert_eq!(connector_atom(atom_type, 32, 0, &atom_data()), None);
        assert_eq!(connector_atom(atom_type, 32, 0, &[]), None);
    }

    #[test]
    fn test_connector_atom_rejects_short_data() {
        let atom_type = u32::from(AtomEnum::ATOM);
        assert_eq!(connector_atom(atom_type, 32, 1, &[0x01, 0x02]), None);
    }
}
