//! Session history store and streak tracking

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::IntervalKind;

/// A completed interval ready to be persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// ISO calendar date, YYYY-MM-DD
    pub date: String,
    /// Wall-clock time of completion, HH:MM:SS
    pub time: String,
    /// Whole minutes spent
    pub duration: u64,
    #[serde(rename = "type")]
    pub kind: IntervalKind,
}

/// A persisted session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: u64,
    pub date: String,
    pub time: String,
    pub duration: u64,
    #[serde(rename = "type")]
    pub kind: IntervalKind,
    pub created_at: DateTime<Utc>,
}

/// Per-day, per-type aggregate for the weekly stats endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTypeStat {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: IntervalKind,
    pub total_minutes: u64,
    pub session_count: u64,
}

/// Per-type aggregate over all recorded sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStat {
    #[serde(rename = "type")]
    pub kind: IntervalKind,
    pub total_minutes: u64,
    pub session_count: u64,
}

/// Consecutive-day work streak
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Streak {
    pub current_streak: u64,
    pub longest_streak: u64,
    pub last_active_date: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Durable store for completed sessions and the work streak.
/// Failures never reach the timer; the caller surfaces them as warnings.
pub trait SessionStore: Send + Sync {
    fn record(&self, session: NewSession) -> Result<SessionRecord, String>;
    fn list(&self) -> Result<Vec<SessionRecord>, String>;
    fn list_by_date(&self, date: &str) -> Result<Vec<SessionRecord>, String>;
    /// Aggregates for the 7 days ending at `today`, grouped by date and type
    fn weekly_stats(&self, today: NaiveDate) -> Result<Vec<DailyTypeStat>, String>;
    fn stats_by_type(&self) -> Result<Vec<TypeStat>, String>;
    fn streak(&self) -> Result<Streak, String>;
    /// Register a completed work day and advance the streak accordingly
    fn mark_active_day(&self, today: NaiveDate) -> Result<Streak, String>;
}

/// Sessions and streak as JSON files in the data directory. The write lock
/// serializes recorder tasks that land concurrently.
pub struct FileSessionStore {
    sessions_path: PathBuf,
    streak_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(data_dir: &std::path::Path) -> Self {
        Self {
            sessions_path: data_dir.join("sessions.json"),
            streak_path: data_dir.join("streak.json"),
            write_lock: Mutex::new(()),
        }
    }

    fn load_sessions(&self) -> Result<Vec<SessionRecord>, String> {
        let raw = match fs::read_to_string(&self.sessions_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(format!("Failed to read {}: {}", self.sessions_path.display(), e)),
        };
        serde_json::from_str(&raw)
            .map_err(|e| format!("Corrupt session file {}: {}", self.sessions_path.display(), e))
    }

    fn save_sessions(&self, sessions: &[SessionRecord]) -> Result<(), String> {
        let json = serde_json::to_string(sessions)
            .map_err(|e| format!("Failed to serialize sessions: {}", e))?;
        fs::write(&self.sessions_path, json)
            .map_err(|e| format!("Failed to write {}: {}", self.sessions_path.display(), e))
    }

    fn load_streak(&self) -> Streak {
        let Ok(raw) = fs::read_to_string(&self.streak_path) else {
            return Streak::default();
        };
        match serde_json::from_str(&raw) {
            Ok(streak) => streak,
            Err(e) => {
                warn!("Ignoring unreadable streak file {}: {}", self.streak_path.display(), e);
                Streak::default()
            }
        }
    }

    fn save_streak(&self, streak: &Streak) -> Result<(), String> {
        let json = serde_json::to_string(streak)
            .map_err(|e| format!("Failed to serialize streak: {}", e))?;
        fs::write(&self.streak_path, json)
            .map_err(|e| format!("Failed to write {}: {}", self.streak_path.display(), e))
    }
}

impl SessionStore for FileSessionStore {
    fn record(&self, session: NewSession) -> Result<SessionRecord, String> {
        let _guard = self.write_lock.lock()
            .map_err(|e| format!("Session store lock poisoned: {}", e))?;

        let mut sessions = self.load_sessions()?;
        let record = SessionRecord {
            id: sessions.last().map(|s| s.id + 1).unwrap_or(1),
            date: session.date,
            time: session.time,
            duration: session.duration,
            kind: session.kind,
            created_at: Utc::now(),
        };
        sessions.push(record.clone());
        self.save_sessions(&sessions)?;
        Ok(record)
    }

    fn list(&self) -> Result<Vec<SessionRecord>, String> {
        self.load_sessions()
    }

    fn list_by_date(&self, date: &str) -> Result<Vec<SessionRecord>, String> {
        Ok(self.load_sessions()?
            .into_iter()
            .filter(|s| s.date == date)
            .collect())
    }

    fn weekly_stats(&self, today: NaiveDate) -> Result<Vec<DailyTypeStat>, String> {
        let cutoff = (today - Duration::days(7)).format("%Y-%m-%d").to_string();
        let mut groups: BTreeMap<(String, &'static str), (u64, u64)> = BTreeMap::new();

        for session in self.load_sessions()? {
            // ISO date strings order lexicographically
            if session.date < cutoff {
                continue;
            }
            let entry = groups
                .entry((session.date.clone(), session.kind.as_str()))
                .or_insert((0, 0));
            entry.0 += session.duration;
            entry.1 += 1;
        }

        Ok(groups
            .into_iter()
            .map(|((date, kind), (total_minutes, session_count))| DailyTypeStat {
                date,
                kind: if kind == "work" { IntervalKind::Work } else { IntervalKind::Break },
                total_minutes,
                session_count,
            })
            .collect())
    }

    fn stats_by_type(&self) -> Result<Vec<TypeStat>, String> {
        let mut work = (0u64, 0u64);
        let mut brk = (0u64, 0u64);
        for session in self.load_sessions()? {
            let slot = match session.kind {
                IntervalKind::Work => &mut work,
                IntervalKind::Break => &mut brk,
            };
            slot.0 += session.duration;
            slot.1 += 1;
        }
        Ok(vec![
            TypeStat { kind: IntervalKind::Work, total_minutes: work.0, session_count: work.1 },
            TypeStat { kind: IntervalKind::Break, total_minutes: brk.0, session_count: brk.1 },
        ])
    }

    fn streak(&self) -> Result<Streak, String> {
        Ok(self.load_streak())
    }

    fn mark_active_day(&self, today: NaiveDate) -> Result<Streak, String> {
        let _guard = self.write_lock.lock()
            .map_err(|e| format!("Session store lock poisoned: {}", e))?;

        let mut streak = self.load_streak();
        let today_str = today.format("%Y-%m-%d").to_string();
        let yesterday = (today - Duration::days(1)).format("%Y-%m-%d").to_string();

        match streak.last_active_date.as_deref() {
            Some(last) if last == yesterday => streak.current_streak += 1,
            Some(last) if last == today_str => {} // already counted today
            _ => streak.current_streak = 1,
        }
        streak.longest_streak = streak.longest_streak.max(streak.current_streak);
        streak.last_active_date = Some(today_str);
        streak.updated_at = Some(Utc::now());

        self.save_streak(&streak)?;
        Ok(streak)
    }
}
