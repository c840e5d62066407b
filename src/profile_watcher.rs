//! Follows edits to the stored profile records
//!
//! Any create or modify event on `<state_dir>/<mode>.toml` becomes a
//! [`Command::ProfileChanged`]; the dispatcher decides whether the mode is
//! current and whether the values actually differ.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::path::Path;
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use crate::config::persistent::TomlStorage;
use crate::ipc::Command;
use crate::mode::Mode;

/// Watch the profile directory; events stop once the watcher is dropped
///
/// The directory is watched rather than the files, since every save replaces
/// a record through a rename.
pub fn spawn_profile_watcher(dir: &Path, sender: Sender<Command>) -> Result<RecommendedWatcher> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create profile directory {}", dir.display()))?;

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if let Some(mode) = changed_mode(&event) {
                debug!(mode = %mode, kind = ?event.kind, "Profile record changed");
                let _ = sender.send(Command::ProfileChanged(mode));
            }
        }
        Err(e) => warn!(error = %e, "Profile watcher error"),
    })
    .context("Failed to create profile watcher")?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch profile directory {}", dir.display()))?;
    info!(dir = %dir.display(), "Watching profile records for edits");
    Ok(watcher)
}

/// Mode whose record an event touched, if any
fn changed_mode(event: &Event) -> Option<Mode> {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return None;
    }
    event
        .paths
        .iter()
        .find_map(|path| TomlStorage::mode_for_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RemoveKind, RenameMode};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(Path::new("/state/profiles").join(path))
    }

    #[test]
    fn test_content_change_maps_to_mode() {
        let modified = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert_eq!(changed_mode(&event(modified, "composite.toml")), Some(Mode::Composite));
        assert_eq!(
            changed_mode(&event(EventKind::Create(CreateKind::File), "hdmi.toml")),
            Some(Mode::Hdmi)
        );
    }

    #[test]
    fn test_rename_into_place_maps_to_mode() {
        let renamed = EventKind::Modify(ModifyKind::Name(RenameMode::Both));
        let event = Event::new(renamed)
            .add_path("/state/profiles/hdmi.toml.tmp".into())
            .add_path("/state/profiles/hdmi.toml".into());
        assert_eq!(changed_mode(&event), Some(Mode::Hdmi));
    }

    #[test]
    fn test_unrelated_events_are_ignored() {
        let modified = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert_eq!(changed_mode(&event(modified, "composite.toml.tmp")), None);
        assert_eq!(changed_mode(&event(modified, "notes.txt")), None);
        assert_eq!(
            changed_mode(&event(EventKind::Remove(RemoveKind::File), "composite.toml")),
            None
        );
    }

    #[test]
    fn test_watcher_reports_record_writes() {
        use crate::config::persistent::{ProfileRecord, ProfileStorage};
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let _watcher = spawn_profile_watcher(dir.path(), tx).unwrap();

        TomlStorage::new(dir.path())
            .write(Mode::Composite, &ProfileRecord::default())
            .unwrap();

        let command = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(command, Command::ProfileChanged(Mode::Composite));
    }
}
