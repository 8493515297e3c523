//! Completion feedback: desktop notifications and the audible alarm

use std::io::{self, Write};

use notify_rust::Notification;
use tracing::debug;

use crate::state::IntervalKind;

/// User-facing completion feedback. Both operations are best-effort:
/// a blocked notification daemon or a mute terminal degrades silently.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: IntervalKind);
    fn play_alarm(&self);
}

/// Desktop notifications via the freedesktop/macOS notification service,
/// alarm as a terminal bell
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, kind: IntervalKind) {
        let (summary, body) = match kind {
            IntervalKind::Work => (
                "Focus session complete!",
                "Great work! Time for a break.",
            ),
            IntervalKind::Break => (
                "Break complete!",
                "Ready to focus again?",
            ),
        };

        if let Err(e) = Notification::new().summary(summary).body(body).show() {
            debug!("Desktop notification failed: {}", e);
        }
    }

    fn play_alarm(&self) {
        // ASCII BEL; harmless when no terminal is attached
        print!("\x07");
        if let Err(e) = io::stdout().flush() {
            debug!("Alarm bell failed: {}", e);
        }
    }
}
