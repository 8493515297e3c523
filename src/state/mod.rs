//! State management module
//!
//! This module contains the timer state machine and the shared application state.

pub mod app_state;
pub mod timer;

// Re-export main types
pub use app_state::{AppError, AppState, MOTIVATIONAL_QUOTES};
pub use timer::{
    CompletedInterval, IntervalKind, PomodoroTimer, TimerSnapshot, TransitionError,
    PARTIAL_SESSION_THRESHOLD_SECS,
};
