//! Session completion pipeline
//!
//! Turns a `CompletedInterval` coming out of the timer state machine into
//! user feedback and a durable session record. Feedback fires first and the
//! persistence call is spawned fire-and-forget, so a slow or failing store
//! never delays the timer or the alarm.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::state::{AppState, CompletedInterval, IntervalKind};
use super::sessions::NewSession;

/// Handle a completed interval: alarm and notification synchronously,
/// quote rotation on work completions, then the session record in a
/// spawned task whose outcome never gates further timer transitions.
pub fn handle_completed_interval(state: &Arc<AppState>, interval: CompletedInterval) {
    state.notifier.play_alarm();
    state.notifier.notify(interval.kind);
    if interval.kind == IntervalKind::Work {
        state.rotate_quote();
    }

    let session = build_session(&interval, Utc::now());
    let state = Arc::clone(state);
    tokio::spawn(async move {
        record_session(state, session).await;
    });
}

/// Build the persistence payload. Recorded minutes are floor(seconds / 60);
/// the pause threshold guarantees partials are at least one minute.
fn build_session(interval: &CompletedInterval, now: DateTime<Utc>) -> NewSession {
    NewSession {
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M:%S").to_string(),
        duration: interval.seconds / 60,
        kind: interval.kind,
    }
}

/// Persist one session and, for work sessions, advance the streak.
/// A store failure is surfaced as a non-blocking warning and not retried:
/// re-attempting here could duplicate the record.
async fn record_session(state: Arc<AppState>, session: NewSession) {
    let kind = session.kind;
    let date = session.date.clone();

    match state.sessions.record(session) {
        Ok(record) => {
            info!("Recorded {} session of {} min on {}", kind.as_str(), record.duration, record.date);
            if kind == IntervalKind::Work {
                match date.parse() {
                    Ok(day) => {
                        if let Err(e) = state.sessions.mark_active_day(day) {
                            warn!("Failed to update streak: {}", e);
                        }
                    }
                    Err(e) => warn!("Unparseable session date {}: {}", date, e),
                }
            }
        }
        Err(e) => {
            state.add_error(format!(
                "Failed to save your {} session — your progress is safe: {}",
                kind.as_str(), e
            ));
        }
    }
}
