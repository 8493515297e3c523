//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::services::{Notifier, SessionStore, SettingsStore, SnapshotStore};
use crate::services::settings::{BREAK_DURATION_KEY, WORK_DURATION_KEY};
use super::{CompletedInterval, PomodoroTimer, TimerSnapshot, TransitionError};

/// Quotes rotated through on each completed work session
pub const MOTIVATIONAL_QUOTES: &[&str] = &[
    "The secret of getting ahead is getting started.",
    "Focus on being productive instead of busy.",
    "Small steps every day add up to big results.",
    "It always seems impossible until it's done.",
    "You don't have to be great to start, but you have to start to be great.",
    "Done is better than perfect.",
    "The way to get started is to quit talking and begin doing.",
    "Concentrate all your thoughts upon the work in hand.",
];

/// Failures surfaced by state operations
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected timer transition; maps to a client error at the API layer
    #[error(transparent)]
    Transition(#[from] TransitionError),
    /// Lock poisoning or store failure; maps to a server error
    #[error("{0}")]
    Internal(String),
}

/// Shared application state: the timer state machine plus the injected
/// collaborator stores and the bookkeeping the status endpoint reports
pub struct AppState {
    timer: Mutex<PomodoroTimer>,
    pub sessions: Arc<dyn SessionStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub notifier: Arc<dyn Notifier>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Non-blocking warnings for client visibility (e.g. failed session saves)
    errors: Mutex<Vec<String>>,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    quote_index: Mutex<usize>,
    /// Running flag watched by the ticker task
    running_tx: watch::Sender<bool>,
    /// Keep the receiver alive to prevent channel closure
    _running_rx: watch::Receiver<bool>,
}

impl AppState {
    /// Create the AppState. Work/break durations come from the settings
    /// store, falling back to the CLI defaults; a persisted snapshot is
    /// restored if present, always paused.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        port: u16,
        host: String,
        default_work_minutes: u64,
        default_break_minutes: u64,
        sessions: Arc<dyn SessionStore>,
        settings: Arc<dyn SettingsStore>,
        snapshots: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let work_secs = settings
            .read_number(WORK_DURATION_KEY)
            .unwrap_or(default_work_minutes) * 60;
        let break_secs = settings
            .read_number(BREAK_DURATION_KEY)
            .unwrap_or(default_break_minutes) * 60;

        let timer = match snapshots.load() {
            Some(snapshot) => {
                info!("Restoring timer snapshot: {}s left on {} interval",
                      snapshot.time_left,
                      if snapshot.is_break { "break" } else { "work" });
                PomodoroTimer::from_snapshot(&snapshot, work_secs, break_secs)
            }
            None => PomodoroTimer::new(work_secs, break_secs),
        };

        let (running_tx, running_rx) = watch::channel(false);

        Self {
            timer: Mutex::new(timer),
            sessions,
            settings,
            snapshots,
            notifier,
            start_time: Instant::now(),
            port,
            host,
            errors: Mutex::new(Vec::new()),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            quote_index: Mutex::new(0),
            running_tx,
            _running_rx: running_rx,
        }
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, PomodoroTimer>, AppError> {
        self.timer.lock()
            .map_err(|e| AppError::Internal(format!("Failed to lock timer state: {}", e)))
    }

    fn track_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn persist_snapshot(&self, snapshot: &TimerSnapshot) {
        if let Err(e) = self.snapshots.save(snapshot) {
            warn!("Failed to persist timer snapshot: {}", e);
        }
    }

    fn set_running_flag(&self, running: bool) {
        if let Err(e) = self.running_tx.send(running) {
            warn!("Failed to publish running flag: {}", e);
        }
    }

    /// Subscribe to the running flag (used by the ticker task)
    pub fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }

    /// Start the countdown
    pub fn start_timer(&self, now: DateTime<Utc>) -> Result<TimerSnapshot, AppError> {
        let mut timer = self.lock_timer()?;
        timer.start(now)?;
        let snapshot = timer.snapshot();
        drop(timer);

        info!("Timer started: {}s left on {} interval",
              snapshot.time_left,
              if snapshot.is_break { "break" } else { "work" });
        self.persist_snapshot(&snapshot);
        self.track_action("start");
        self.set_running_flag(true);
        Ok(snapshot)
    }

    /// Pause the countdown, possibly yielding a partial completed interval
    pub fn pause_timer(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(TimerSnapshot, Option<CompletedInterval>), AppError> {
        let mut timer = self.lock_timer()?;
        let partial = timer.pause(now)?;
        let snapshot = timer.snapshot();
        drop(timer);

        info!("Timer paused with {}s left", snapshot.time_left);
        self.persist_snapshot(&snapshot);
        self.track_action("pause");
        self.set_running_flag(false);
        Ok((snapshot, partial))
    }

    /// Reset the current interval, forfeiting partial progress
    pub fn reset_timer(&self) -> Result<TimerSnapshot, AppError> {
        let mut timer = self.lock_timer()?;
        timer.reset();
        let snapshot = timer.snapshot();
        drop(timer);

        info!("Timer reset to {}s", snapshot.time_left);
        if let Err(e) = self.snapshots.clear() {
            warn!("Failed to clear timer snapshot: {}", e);
        }
        self.track_action("reset");
        self.set_running_flag(false);
        Ok(snapshot)
    }

    /// Advance the countdown; called by the ticker task. On natural
    /// completion the running flag drops, cancelling the tick loop.
    pub fn advance_timer(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(TimerSnapshot, Option<CompletedInterval>), AppError> {
        let mut timer = self.lock_timer()?;
        let finished = timer.tick(now);
        let snapshot = timer.snapshot();
        drop(timer);

        self.persist_snapshot(&snapshot);
        if finished.is_some() {
            self.set_running_flag(false);
        }
        Ok((snapshot, finished))
    }

    /// Apply new durations, persisting them and re-deriving a paused timer
    /// of the matching kind. `None` leaves a duration unchanged.
    pub fn set_durations(
        &self,
        work_minutes: Option<u64>,
        break_minutes: Option<u64>,
    ) -> Result<TimerSnapshot, AppError> {
        let mut timer = self.lock_timer()?;
        if let Some(minutes) = work_minutes {
            timer.set_work_duration(minutes * 60);
            if let Err(e) = self.settings.write_number(WORK_DURATION_KEY, minutes) {
                warn!("Failed to persist work duration: {}", e);
            }
        }
        if let Some(minutes) = break_minutes {
            timer.set_break_duration(minutes * 60);
            if let Err(e) = self.settings.write_number(BREAK_DURATION_KEY, minutes) {
                warn!("Failed to persist break duration: {}", e);
            }
        }
        let snapshot = timer.snapshot();
        drop(timer);

        self.persist_snapshot(&snapshot);
        self.track_action("settings");
        Ok(snapshot)
    }

    /// Configured durations in minutes as (work, break)
    pub fn durations_minutes(&self) -> Result<(u64, u64), AppError> {
        let timer = self.lock_timer()?;
        Ok((timer.work_secs() / 60, timer.break_secs() / 60))
    }

    /// Current timer view
    pub fn timer_snapshot(&self) -> Result<TimerSnapshot, AppError> {
        Ok(self.lock_timer()?.snapshot())
    }

    /// Add a non-blocking warning to the state
    pub fn add_error(&self, error: String) {
        warn!("Adding error to state: {}", error);
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(error);
        }
    }

    pub fn get_errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Advance the motivational quote; called on work completions only
    pub fn rotate_quote(&self) {
        if let Ok(mut index) = self.quote_index.lock() {
            *index = (*index + 1) % MOTIVATIONAL_QUOTES.len();
        }
    }

    pub fn current_quote(&self) -> &'static str {
        let index = self.quote_index.lock().map(|i| *i).unwrap_or(0);
        MOTIVATIONAL_QUOTES[index]
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
