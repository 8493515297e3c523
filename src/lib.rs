//! Focusd - A state-managed HTTP server for Pomodoro focus timing
//!
//! This library provides a wall-clock-anchored Pomodoro timer state machine,
//! the session recording pipeline it feeds, and the HTTP surface that
//! controls them.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
