//! Collaborator services module
//!
//! Stores and dispatchers the timer core talks to through traits, so tests
//! can substitute in-memory fakes for the file-backed implementations.

pub mod notifier;
pub mod recorder;
pub mod sessions;
pub mod settings;
pub mod snapshot;

// Re-export main types
pub use notifier::{DesktopNotifier, Notifier};
pub use recorder::handle_completed_interval;
pub use sessions::{FileSessionStore, SessionStore};
pub use settings::{FileSettingsStore, SettingsStore};
pub use snapshot::{FileSnapshotStore, SnapshotStore};
