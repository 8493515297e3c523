//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use tracing::{error, info};

use crate::{
    services::handle_completed_interval,
    services::sessions::{DailyTypeStat, SessionRecord, Streak, TypeStat},
    state::AppState,
};
use super::responses::{
    ApiError, ApiResponse, HealthResponse, SettingsResponse, StatusResponse,
    UpdateSettingsRequest,
};

/// Handle POST /timer/start - Begin the countdown
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.start_timer(Utc::now())?;
    info!("Start endpoint called - countdown running");
    Ok(Json(ApiResponse::running("Timer started".to_string(), timer)))
}

/// Handle POST /timer/pause - Stop the countdown, recording a partial
/// session when the running segment was long enough
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    let (timer, partial) = state.pause_timer(Utc::now())?;

    let message = match partial {
        Some(interval) => {
            info!("Pause endpoint called - recording {}s partial {} session",
                  interval.seconds, interval.kind.as_str());
            handle_completed_interval(&state, interval);
            "Timer paused, partial session recorded".to_string()
        }
        None => {
            info!("Pause endpoint called");
            "Timer paused".to_string()
        }
    };
    Ok(Json(ApiResponse::paused(message, timer)))
}

/// Handle POST /timer/reset - Reload the current interval, forfeiting progress
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.reset_timer()?;
    info!("Reset endpoint called");
    Ok(Json(ApiResponse::paused("Timer reset".to_string(), timer)))
}

/// Handle GET /status - Return timer state and server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let timer = state.timer_snapshot()?;
    let (work_minutes, break_minutes) = state.durations_minutes()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        work_minutes,
        break_minutes,
        quote: state.current_quote().to_string(),
        errors: state.get_errors(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /settings - Return configured durations
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsResponse>, ApiError> {
    let (work_minutes, break_minutes) = state.durations_minutes()?;
    Ok(Json(SettingsResponse { work_minutes, break_minutes }))
}

/// Handle PUT /settings - Update work/break durations.
/// Work must be 1-60 minutes, break 1-30; out-of-range changes nothing.
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    if let Some(minutes) = request.work_minutes {
        if !(1..=60).contains(&minutes) {
            return Err(ApiError::bad_request("work_minutes must be between 1 and 60"));
        }
    }
    if let Some(minutes) = request.break_minutes {
        if !(1..=30).contains(&minutes) {
            return Err(ApiError::bad_request("break_minutes must be between 1 and 30"));
        }
    }

    state.set_durations(request.work_minutes, request.break_minutes)?;
    let (work_minutes, break_minutes) = state.durations_minutes()?;
    info!("Settings updated: work={}min, break={}min", work_minutes, break_minutes);
    Ok(Json(SettingsResponse { work_minutes, break_minutes }))
}

/// Handle GET /sessions - All recorded sessions, oldest first
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    state.sessions.list().map(Json).map_err(|e| {
        error!("Failed to list sessions: {}", e);
        ApiError::from(e)
    })
}

/// Handle GET /sessions/:date - Sessions recorded on one calendar date
pub async fn sessions_by_date_handler(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<SessionRecord>>, ApiError> {
    state.sessions.list_by_date(&date).map(Json).map_err(|e| {
        error!("Failed to list sessions for {}: {}", date, e);
        ApiError::from(e)
    })
}

/// Handle GET /sessions/stats/weekly - Last 7 days grouped by date and type
pub async fn weekly_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DailyTypeStat>>, ApiError> {
    state
        .sessions
        .weekly_stats(Utc::now().date_naive())
        .map(Json)
        .map_err(|e| {
            error!("Failed to compute weekly stats: {}", e);
            ApiError::from(e)
        })
}

/// Handle GET /sessions/stats/by-type - Work vs break totals
pub async fn stats_by_type_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TypeStat>>, ApiError> {
    state.sessions.stats_by_type().map(Json).map_err(|e| {
        error!("Failed to compute type stats: {}", e);
        ApiError::from(e)
    })
}

/// Handle GET /streak - Current consecutive-day work streak
pub async fn streak_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Streak>, ApiError> {
    state.sessions.streak().map(Json).map_err(|e| {
        error!("Failed to read streak: {}", e);
        ApiError::from(e)
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
