//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::ClockError,
    state::{CountdownSnapshot, HistoryEntry, StopwatchSnapshot, Theme},
};

/// API response structure for clock operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a new API response
    pub fn new(status: &str, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            data,
        }
    }

    /// Create a success response
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new("ok", message, data)
    }
}

/// Error body returned with a non-2xx status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for ClockError {
    fn into_response(self) -> Response {
        let code = match &self {
            ClockError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
            ClockError::ConfirmationRequired => StatusCode::CONFLICT,
            ClockError::StatePoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (code, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Minutes as typed by the user; either a JSON number or a string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinutesInput {
    Number(serde_json::Number),
    Text(String),
}

impl MinutesInput {
    pub fn as_text(&self) -> String {
        match self {
            MinutesInput::Number(n) => n.to_string(),
            MinutesInput::Text(s) => s.clone(),
        }
    }
}

/// Body of POST /timer/duration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDurationRequest {
    pub minutes: MinutesInput,
}

/// Body of PUT /theme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// Query of DELETE /history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearHistoryQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Result of a stopwatch reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopwatchResetData {
    pub stopwatch: StopwatchSnapshot,
    pub recorded: Option<HistoryEntry>,
}

/// Selected theme with its display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeData {
    pub theme: Theme,
    pub name: String,
}

impl From<Theme> for ThemeData {
    fn from(theme: Theme) -> Self {
        Self {
            theme,
            name: theme.display_name().to_string(),
        }
    }
}

/// Full status response with both clocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub countdown: CountdownSnapshot,
    pub stopwatch: StopwatchSnapshot,
    pub history_entries: usize,
    pub theme: ThemeData,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
