//! Pomodoro timer state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds a running segment must last before a pause records a partial session
pub const PARTIAL_SESSION_THRESHOLD_SECS: u64 = 60;

/// Which kind of interval is (or was) counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Work,
    Break,
}

impl IntervalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalKind::Work => "work",
            IntervalKind::Break => "break",
        }
    }
}

/// Emitted when an interval finishes naturally or a qualifying pause cuts it short.
/// Handed to the session recorder and forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedInterval {
    pub kind: IntervalKind,
    /// Seconds actually spent (full configured length for natural completions)
    pub seconds: u64,
}

/// Rejected timer transitions. State is never modified when one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("timer is already running")]
    AlreadyRunning,
    #[error("timer is not running")]
    NotRunning,
    #[error("no time left in the current interval; reset first")]
    Expired,
}

/// Serializable view of the timer, persisted across restarts.
/// `is_running` is stored but always coerced to false on restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub time_left: u64,
    pub total_time: u64,
    pub is_running: bool,
    pub is_break: bool,
}

/// The Pomodoro countdown state machine.
///
/// Remaining time is always derived from a wall-clock anchor recorded at
/// start, never from counting ticks, so a delayed or missed tick loses
/// nothing. Every method that depends on the clock takes `now` explicitly;
/// the caller (ticker task or test) owns the clock.
#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    time_left: u64,
    total_time: u64,
    is_running: bool,
    is_break: bool,
    work_secs: u64,
    break_secs: u64,
    /// Wall-clock instant the current running segment began, with the
    /// remaining seconds captured at that instant. None while paused.
    anchor: Option<(DateTime<Utc>, u64)>,
}

impl PomodoroTimer {
    /// Create a paused work interval of the configured length
    pub fn new(work_secs: u64, break_secs: u64) -> Self {
        Self {
            time_left: work_secs,
            total_time: work_secs,
            is_running: false,
            is_break: false,
            work_secs,
            break_secs,
            anchor: None,
        }
    }

    /// Restore from a persisted snapshot. The restored timer is always
    /// paused, and `total_time` is re-derived from the configured duration
    /// for the restored kind so the snapshot cannot outlive a settings change.
    pub fn from_snapshot(snapshot: &TimerSnapshot, work_secs: u64, break_secs: u64) -> Self {
        let total = if snapshot.is_break { break_secs } else { work_secs };
        Self {
            time_left: snapshot.time_left.min(total),
            total_time: total,
            is_running: false,
            is_break: snapshot.is_break,
            work_secs,
            break_secs,
            anchor: None,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            time_left: self.time_left,
            total_time: self.total_time,
            is_running: self.is_running,
            is_break: self.is_break,
        }
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_break(&self) -> bool {
        self.is_break
    }

    pub fn work_secs(&self) -> u64 {
        self.work_secs
    }

    pub fn break_secs(&self) -> u64 {
        self.break_secs
    }

    pub fn current_kind(&self) -> IntervalKind {
        if self.is_break {
            IntervalKind::Break
        } else {
            IntervalKind::Work
        }
    }

    fn configured_secs(&self, kind: IntervalKind) -> u64 {
        match kind {
            IntervalKind::Work => self.work_secs,
            IntervalKind::Break => self.break_secs,
        }
    }

    /// Whole seconds elapsed since the anchor, clamped to zero if the
    /// system clock moved backwards.
    fn elapsed_since(anchor: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        (now - anchor).num_seconds().max(0) as u64
    }

    /// Begin counting down. Valid only while paused with time remaining.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.is_running {
            return Err(TransitionError::AlreadyRunning);
        }
        if self.time_left == 0 {
            return Err(TransitionError::Expired);
        }
        self.anchor = Some((now, self.time_left));
        self.is_running = true;
        Ok(())
    }

    /// Stop counting down. Returns a partial `CompletedInterval` when the
    /// just-ended running segment lasted at least the threshold; the
    /// interval kind is NOT flipped for partials. A duration change made
    /// while running takes effect here: `total_time` reloads from the
    /// current kind's configured length and `time_left` clamps into range.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Option<CompletedInterval>, TransitionError> {
        let (anchor, base) = match self.anchor {
            Some(a) if self.is_running => a,
            _ => return Err(TransitionError::NotRunning),
        };

        let elapsed = Self::elapsed_since(anchor, now);
        let spent = elapsed.min(base);
        self.total_time = self.configured_secs(self.current_kind());
        self.time_left = (base - spent).min(self.total_time);
        self.is_running = false;
        self.anchor = None;

        if spent >= PARTIAL_SESSION_THRESHOLD_SECS {
            Ok(Some(CompletedInterval {
                kind: self.current_kind(),
                seconds: spent,
            }))
        } else {
            Ok(None)
        }
    }

    /// Recompute remaining time from the anchor. A no-op while paused.
    ///
    /// Reaching zero is a natural completion: the full configured duration
    /// is reported, the interval kind flips, and the newly active kind's
    /// configured duration is loaded. A large elapsed jump (machine asleep,
    /// stopped process) completes immediately rather than losing time.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<CompletedInterval> {
        let (anchor, base) = match self.anchor {
            Some(a) if self.is_running => a,
            _ => return None,
        };

        let elapsed = Self::elapsed_since(anchor, now);
        let remaining = base.saturating_sub(elapsed);

        if remaining == 0 {
            let finished = CompletedInterval {
                kind: self.current_kind(),
                seconds: self.total_time,
            };
            self.is_break = !self.is_break;
            self.total_time = self.configured_secs(self.current_kind());
            self.time_left = self.total_time;
            self.is_running = false;
            self.anchor = None;
            Some(finished)
        } else {
            self.time_left = remaining;
            None
        }
    }

    /// Reload the current kind's configured duration and stop. Valid any
    /// time, idempotent, and never emits an interval: an explicit reset
    /// forfeits partial progress.
    pub fn reset(&mut self) {
        self.total_time = self.configured_secs(self.current_kind());
        self.time_left = self.total_time;
        self.is_running = false;
        self.anchor = None;
    }

    /// Change the configured work length. A paused work interval is
    /// re-derived immediately; a running countdown is left undisturbed
    /// until the next pause or reset.
    pub fn set_work_duration(&mut self, secs: u64) {
        self.work_secs = secs;
        if !self.is_running && !self.is_break {
            self.total_time = secs;
            self.time_left = secs;
        }
    }

    /// Change the configured break length; same rules as `set_work_duration`.
    pub fn set_break_duration(&mut self, secs: u64) {
        self.break_secs = secs;
        if !self.is_running && self.is_break {
            self.total_time = secs;
            self.time_left = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const WORK: u64 = 25 * 60;
    const BREAK: u64 = 5 * 60;

    fn t0() -> DateTime<Utc> {
        "2026-08-31T09:00:00Z".parse().unwrap()
    }

    fn after(secs: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(secs)
    }

    #[test]
    fn new_timer_is_paused_work() {
        let timer = PomodoroTimer::new(WORK, BREAK);
        assert_eq!(timer.time_left(), WORK);
        assert_eq!(timer.total_time(), WORK);
        assert!(!timer.is_running());
        assert!(!timer.is_break());
    }

    #[test]
    fn tick_recomputes_from_anchor() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        assert_eq!(timer.tick(after(90)), None);
        assert_eq!(timer.time_left(), WORK - 90);
        // A skipped tick loses nothing
        assert_eq!(timer.tick(after(600)), None);
        assert_eq!(timer.time_left(), WORK - 600);
    }

    #[test]
    fn natural_completion_flips_to_break() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();

        let done = timer.tick(after(WORK as i64)).expect("should complete");
        assert_eq!(done.kind, IntervalKind::Work);
        assert_eq!(done.seconds, WORK);
        assert!(timer.is_break());
        assert!(!timer.is_running());
        assert_eq!(timer.total_time(), BREAK);
        assert_eq!(timer.time_left(), BREAK);
    }

    #[test]
    fn break_completion_flips_back_to_work() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        timer.tick(after(WORK as i64)).unwrap();

        timer.start(after(2000)).unwrap();
        let done = timer
            .tick(after(2000 + BREAK as i64))
            .expect("break should complete");
        assert_eq!(done.kind, IntervalKind::Break);
        assert_eq!(done.seconds, BREAK);
        assert!(!timer.is_break());
        assert_eq!(timer.time_left(), WORK);
    }

    #[test]
    fn large_time_jump_completes_instead_of_going_negative() {
        let mut timer = PomodoroTimer::new(1500, BREAK);
        timer.start(t0()).unwrap();

        // Anchor far in the past (e.g. laptop slept through the interval)
        let done = timer.tick(after(3 * 1500)).expect("should complete");
        assert_eq!(done.seconds, 1500);
        assert_eq!(timer.time_left(), BREAK);
    }

    #[test]
    fn backwards_clock_clamps_to_zero_elapsed() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        assert_eq!(timer.tick(after(-3600)), None);
        assert_eq!(timer.time_left(), WORK);

        let partial = timer.pause(after(-3600)).unwrap();
        assert_eq!(partial, None);
        assert_eq!(timer.time_left(), WORK);
    }

    #[test]
    fn quick_pause_does_not_record() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        let partial = timer.pause(after(59)).unwrap();
        assert_eq!(partial, None);
        assert_eq!(timer.time_left(), WORK - 59);
    }

    #[test]
    fn pause_at_threshold_records_partial_without_flipping() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();

        let partial = timer.pause(after(90)).unwrap().expect("90s should record");
        assert_eq!(partial.kind, IntervalKind::Work);
        assert_eq!(partial.seconds, 90);
        assert!(!timer.is_break(), "partial must not flip the interval kind");
        assert_eq!(timer.time_left(), WORK - 90);
    }

    #[test]
    fn threshold_counts_the_segment_not_the_interval() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);

        // First segment: 45s, below threshold
        timer.start(t0()).unwrap();
        assert_eq!(timer.pause(after(45)).unwrap(), None);

        // Second segment: another 45s. Cumulative is 90s but the segment
        // alone stays below the threshold, so nothing is recorded.
        timer.start(after(100)).unwrap();
        assert_eq!(timer.pause(after(145)).unwrap(), None);
        assert_eq!(timer.time_left(), WORK - 90);
    }

    #[test]
    fn resume_continues_where_pause_left_off() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        timer.pause(after(300)).unwrap();
        assert_eq!(timer.time_left(), WORK - 300);

        timer.start(after(1000)).unwrap();
        assert_eq!(timer.tick(after(1100)), None);
        assert_eq!(timer.time_left(), WORK - 400);
    }

    #[test]
    fn invalid_transitions_are_rejected_and_harmless() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        assert_eq!(timer.pause(t0()), Err(TransitionError::NotRunning));

        timer.start(t0()).unwrap();
        assert_eq!(timer.start(after(1)), Err(TransitionError::AlreadyRunning));
        assert!(timer.is_running());

        // Rejected start must not re-anchor: elapsed still counts from t0
        assert_eq!(timer.tick(after(10)), None);
        assert_eq!(timer.time_left(), WORK - 10);
    }

    #[test]
    fn start_with_no_time_left_is_rejected() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        // Pause exactly at expiry: clamps to zero without completing
        timer.pause(after(WORK as i64 + 50)).unwrap();
        assert_eq!(timer.time_left(), 0);
        assert_eq!(timer.start(after(2000)), Err(TransitionError::Expired));
    }

    #[test]
    fn reset_reloads_configured_duration_and_is_idempotent() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        assert_eq!(timer.tick(after(200)), None);

        timer.reset();
        let first = timer.snapshot();
        timer.reset();
        let second = timer.snapshot();

        assert_eq!(first.time_left, WORK);
        assert_eq!(first.total_time, WORK);
        assert!(!first.is_running);
        assert_eq!(first.time_left, second.time_left);
        assert_eq!(first.total_time, second.total_time);
        assert_eq!(first.is_running, second.is_running);
        assert_eq!(first.is_break, second.is_break);
    }

    #[test]
    fn reset_during_break_uses_break_duration() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        timer.tick(after(WORK as i64)).unwrap();

        timer.start(after(2000)).unwrap();
        assert_eq!(timer.tick(after(2060)), None);
        timer.pause(after(2100)).unwrap();
        timer.reset();
        assert!(timer.is_break());
        assert_eq!(timer.time_left(), BREAK);
        assert_eq!(timer.total_time(), BREAK);
    }

    #[test]
    fn duration_change_rederives_paused_matching_kind_only() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);

        // Paused on work: work change applies immediately
        timer.set_work_duration(30 * 60);
        assert_eq!(timer.time_left(), 30 * 60);
        assert_eq!(timer.total_time(), 30 * 60);

        // Break change does not touch a work interval
        timer.set_break_duration(10 * 60);
        assert_eq!(timer.time_left(), 30 * 60);
        assert_eq!(timer.break_secs(), 10 * 60);
    }

    #[test]
    fn duration_change_never_disturbs_a_running_countdown() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        timer.tick(after(60));

        timer.set_work_duration(50 * 60);
        assert_eq!(timer.total_time(), WORK);
        assert_eq!(timer.time_left(), WORK - 60);

        timer.reset();
        assert_eq!(timer.time_left(), 50 * 60);
    }

    #[test]
    fn pause_applies_a_duration_change_made_while_running() {
        let mut timer = PomodoroTimer::new(1500, BREAK);
        timer.start(t0()).unwrap();
        timer.set_work_duration(3000);

        // The countdown keeps its old length until the pause re-evaluates it
        assert_eq!(timer.tick(after(50)), None);
        assert_eq!(timer.total_time(), 1500);

        timer.pause(after(100)).unwrap();
        assert_eq!(timer.total_time(), 3000);
        assert_eq!(timer.time_left(), 1400);
    }

    #[test]
    fn pause_clamps_remaining_when_the_new_duration_is_shorter() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        timer.set_work_duration(600);

        timer.pause(after(100)).unwrap();
        assert_eq!(timer.total_time(), 600);
        assert_eq!(timer.time_left(), 600);
    }

    #[test]
    fn snapshot_restore_forces_paused() {
        let mut timer = PomodoroTimer::new(WORK, BREAK);
        timer.start(t0()).unwrap();
        timer.tick(after(120));

        let mut snap = timer.snapshot();
        assert!(snap.is_running);
        snap.is_running = true; // even a tampered snapshot restores paused

        let restored = PomodoroTimer::from_snapshot(&snap, WORK, BREAK);
        assert!(!restored.is_running());
        assert_eq!(restored.time_left(), WORK - 120);
        assert_eq!(restored.total_time(), WORK);
    }

    #[test]
    fn snapshot_restore_clamps_to_current_settings() {
        let snap = TimerSnapshot {
            time_left: 40 * 60,
            total_time: 40 * 60,
            is_running: false,
            is_break: false,
        };
        // Work duration has since been lowered to 25 minutes
        let restored = PomodoroTimer::from_snapshot(&snap, WORK, BREAK);
        assert_eq!(restored.total_time(), WORK);
        assert_eq!(restored.time_left(), WORK);
    }

    #[test]
    fn full_cycle_scenario() {
        // workDuration=25min, breakDuration=5min: run work to completion,
        // then pause the break after 90 seconds.
        let mut timer = PomodoroTimer::new(1500, 300);
        timer.start(t0()).unwrap();

        let work = timer.tick(after(1500)).expect("work completes");
        assert_eq!(work.kind, IntervalKind::Work);
        assert_eq!(work.seconds, 1500);
        assert!(timer.is_break());
        assert_eq!(timer.time_left(), 300);

        timer.start(after(1600)).unwrap();
        let partial = timer.pause(after(1690)).unwrap().expect("90s break partial");
        assert_eq!(partial.kind, IntervalKind::Break);
        assert_eq!(partial.seconds, 90);
        assert!(timer.is_break(), "partial break keeps the break interval");
    }
}
