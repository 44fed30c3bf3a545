//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{
    error::ClockError,
    state::{AppState, CountdownSnapshot, HistoryEntry, StopwatchSnapshot},
};
use super::responses::{
    ApiResponse, ClearHistoryQuery, HealthResponse, SetDurationRequest, StatusResponse,
    StopwatchResetData, ThemeData, ThemeRequest,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ClockError>;

/// Log a failed clock operation before it becomes an error response
fn logged<T>(action: &str, result: Result<T, ClockError>) -> Result<T, ClockError> {
    result.map_err(|e| {
        match &e {
            ClockError::StatePoisoned(_) => error!("{} failed: {}", action, e),
            _ => warn!("{} rejected: {}", action, e),
        }
        e
    })
}

/// Handle GET /timer - Current countdown state
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownSnapshot> {
    let snapshot = logged("timer", state.countdown_snapshot())?;
    Ok(Json(ApiResponse::ok("Countdown state", snapshot)))
}

/// Handle POST /timer/duration - Set the countdown duration in minutes
pub async fn timer_duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetDurationRequest>,
) -> ApiResult<CountdownSnapshot> {
    let snapshot = logged("timer-set", state.set_duration_input(&request.minutes.as_text()))?;
    info!("Timer duration endpoint called - {}", snapshot.display);
    Ok(Json(ApiResponse::ok(
        format!("Countdown set to {}", snapshot.display),
        snapshot,
    )))
}

/// Handle POST /timer/start - Start or resume the countdown
pub async fn timer_start_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownSnapshot> {
    let snapshot = logged("timer-start", state.start_countdown())?;
    Ok(Json(ApiResponse::ok("Countdown started", snapshot)))
}

/// Handle POST /timer/pause - Pause the countdown
pub async fn timer_pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownSnapshot> {
    let snapshot = logged("timer-pause", state.pause_countdown())?;
    Ok(Json(ApiResponse::ok("Countdown paused", snapshot)))
}

/// Handle POST /timer/reset - Rewind the countdown to its full duration
pub async fn timer_reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountdownSnapshot> {
    let snapshot = logged("timer-reset", state.reset_countdown())?;
    Ok(Json(ApiResponse::ok("Countdown reset", snapshot)))
}

/// Handle GET /stopwatch - Current stopwatch state
pub async fn stopwatch_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchSnapshot> {
    let snapshot = logged("stopwatch", state.stopwatch_snapshot())?;
    Ok(Json(ApiResponse::ok("Stopwatch state", snapshot)))
}

/// Handle POST /stopwatch/start - Start or resume the stopwatch
pub async fn stopwatch_start_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchSnapshot> {
    let snapshot = logged("stopwatch-start", state.start_stopwatch())?;
    Ok(Json(ApiResponse::ok("Stopwatch started", snapshot)))
}

/// Handle POST /stopwatch/pause - Pause the stopwatch
pub async fn stopwatch_pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchSnapshot> {
    let snapshot = logged("stopwatch-pause", state.pause_stopwatch())?;
    Ok(Json(ApiResponse::ok("Stopwatch paused", snapshot)))
}

/// Handle POST /stopwatch/reset - Log the session and zero the stopwatch
pub async fn stopwatch_reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<StopwatchResetData> {
    let (stopwatch, recorded) = logged("stopwatch-reset", state.reset_stopwatch())?;
    let message = match &recorded {
        Some(entry) => format!("Stopwatch reset, recorded {}", entry.duration),
        None => "Stopwatch reset".to_string(),
    };
    Ok(Json(ApiResponse::ok(message, StopwatchResetData { stopwatch, recorded })))
}

/// Handle GET /history - Completed sessions, newest first
pub async fn history_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<HistoryEntry>> {
    let entries = logged("history", state.history())?;
    Ok(Json(ApiResponse::ok(format!("{} sessions", entries.len()), entries)))
}

/// Handle DELETE /history?confirm=true - Clear the session history
pub async fn clear_history_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClearHistoryQuery>,
) -> ApiResult<Vec<HistoryEntry>> {
    logged("history-clear", state.clear_history(query.confirm))?;
    info!("History cleared");
    Ok(Json(ApiResponse::ok("Study history cleared", Vec::new())))
}

/// Handle GET /theme - Selected background theme
pub async fn theme_handler(State(state): State<Arc<AppState>>) -> ApiResult<ThemeData> {
    let theme = logged("theme", state.theme())?;
    Ok(Json(ApiResponse::ok("Current theme", theme.into())))
}

/// Handle PUT /theme - Select a background theme
pub async fn set_theme_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ThemeRequest>,
) -> ApiResult<ThemeData> {
    let theme = logged("theme", state.set_theme(request.theme))?;
    Ok(Json(ApiResponse::ok(
        format!("{} activated", theme.display_name()),
        theme.into(),
    )))
}

/// Handle GET /status - Both clocks plus server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ClockError> {
    let countdown = logged("status", state.countdown_snapshot())?;
    let stopwatch = logged("status", state.stopwatch_snapshot())?;
    let history_entries = logged("status", state.history())?.len();
    let theme = logged("status", state.theme())?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        countdown,
        stopwatch,
        history_entries,
        theme: theme.into(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Server-sent stream of display updates and signals
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.subscribe();
    info!("Event stream subscriber connected");

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((Event::default().json_data(&event), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
