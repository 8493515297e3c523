//! Timer snapshot persistence

use std::{fs, io::ErrorKind, path::PathBuf};
use tracing::warn;

use crate::state::TimerSnapshot;

/// Durable storage for the timer snapshot, written on every state
/// mutation and read back once at startup.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), String>;
    fn load(&self) -> Option<TimerSnapshot>;
    fn clear(&self) -> Result<(), String>;
}

/// Snapshot as a single JSON file in the data directory
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), String> {
        let json = serde_json::to_string(snapshot)
            .map_err(|e| format!("Failed to serialize snapshot: {}", e))?;
        fs::write(&self.path, json)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }

    fn load(&self) -> Option<TimerSnapshot> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read snapshot {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Ignoring unreadable snapshot {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn clear(&self) -> Result<(), String> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Failed to remove {}: {}", self.path.display(), e)),
        }
    }
}
