//! Durable key/value settings store

use std::{collections::BTreeMap, fs, path::PathBuf};
use tracing::warn;

pub const WORK_DURATION_KEY: &str = "work-duration-minutes";
pub const BREAK_DURATION_KEY: &str = "break-duration-minutes";

/// Durable numeric key/value settings. Absent keys fall back to defaults
/// at the call site.
pub trait SettingsStore: Send + Sync {
    fn read_number(&self, key: &str) -> Option<u64>;
    fn write_number(&self, key: &str, value: u64) -> Result<(), String>;
}

/// Settings persisted as a flat JSON object in the data directory
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> BTreeMap<String, u64> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!("Ignoring unreadable settings file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn read_number(&self, key: &str) -> Option<u64> {
        self.load().get(key).copied()
    }

    fn write_number(&self, key: &str, value: u64) -> Result<(), String> {
        let mut map = self.load();
        map.insert(key.to_string(), value);
        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        fs::write(&self.path, json)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }
}
