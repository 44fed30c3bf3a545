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
        .route("/timer", get(timer_handler))
        .route("/timer/duration", post(timer_duration_handler))
        .route("/timer/start", post(timer_start_handler))
        .route("/timer/pause", post(timer_pause_handler))
        .route("/timer/reset", post(timer_reset_handler))
        .route("/stopwatch", get(stopwatch_handler))
        .route("/stopwatch/start", post(stopwatch_start_handler))
        .route("/stopwatch/pause", post(stopwatch_pause_handler))
        .route("/stopwatch/reset", post(stopwatch_reset_handler))
        .route("/history", get(history_handler).delete(clear_history_handler))
        .route("/theme", get(theme_handler).put(set_theme_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
