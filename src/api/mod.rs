//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_timer_handler))
        .route("/timer/pause", post(pause_timer_handler))
        .route("/timer/reset", post(reset_timer_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/sessions", get(list_sessions_handler))
        .route("/sessions/stats/weekly", get(weekly_stats_handler))
        .route("/sessions/stats/by-type", get(stats_by_type_handler))
        .route("/sessions/:date", get(sessions_by_date_handler))
        .route("/streak", get(streak_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
