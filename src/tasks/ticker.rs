//! Countdown ticker background task

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::{
    services::handle_completed_interval,
    state::AppState,
};

/// Background task that drives the timer while it is running.
///
/// The loop waits on the running flag, then ticks once a second inside a
/// select! that also observes the flag, so a pause or reset cancels the
/// countdown immediately and no stale tick fires afterwards. Each tick
/// recomputes remaining time from the wall-clock anchor, so delayed ticks
/// cost nothing.
pub async fn ticker_task(state: Arc<AppState>) {
    info!("Starting countdown ticker task");

    let mut running_rx = state.subscribe_running();

    loop {
        // Wait until the timer is started
        while !*running_rx.borrow() {
            if running_rx.changed().await.is_err() {
                debug!("Running flag channel closed, ticker exiting");
                return;
            }
        }

        debug!("Timer running, entering tick loop");
        let mut ticks = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                // Tick - recompute remaining time from the anchor
                _ = ticks.tick() => {
                    match state.advance_timer(Utc::now()) {
                        Ok((snapshot, Some(finished))) => {
                            info!("Interval completed naturally, next: {}s {} interval",
                                  snapshot.total_time,
                                  if snapshot.is_break { "break" } else { "work" });
                            handle_completed_interval(&state, finished);
                            break;
                        }
                        Ok((_, None)) => {}
                        Err(e) => {
                            error!("Failed to advance timer: {}", e);
                            break;
                        }
                    }
                }

                // Flag change - stop ticking when the timer pauses or resets
                changed = running_rx.changed() => {
                    if changed.is_err() {
                        debug!("Running flag channel closed, ticker exiting");
                        return;
                    }
                    if !*running_rx.borrow() {
                        debug!("Timer stopped, cancelling tick loop");
                        break;
                    }
                }
            }
        }
    }
}
