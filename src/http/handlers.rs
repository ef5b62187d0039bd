use super::state::AppState;
use crate::settings::UserSettings;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.supervisor.session_count().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            sessions,
        }),
    )
}

/// POST /sessions
/// Start a session explicitly (they also start lazily on first attach)
pub async fn create_session(
    State(state): State<AppState>,
    request: Option<Json<CreateSessionRequest>>,
) -> impl IntoResponse {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let session_id = request
        .session_id
        .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));

    info!("Creating session: {}", session_id);
    state.supervisor.ensure_session(&session_id).await;

    (
        StatusCode::OK,
        Json(CreateSessionResponse {
            session_id,
            status: "running".to_string(),
        }),
    )
}

/// GET /sessions/:session_id
/// Stats for a running session
pub async fn get_session_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.supervisor.session_stats(&session_id).await {
        Some(stats) => (StatusCode::OK, Json(stats)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// POST /sessions/:session_id/end
/// End a session, tearing down its stages and logs. Idempotent: ending an
/// unknown or already-ended session still reports ok.
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    state.supervisor.end_session(&session_id).await;
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "ok".to_string(),
        }),
    )
}

/// POST /settings/:session_id
/// Store rendering preferences for a session
pub async fn set_settings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(settings): Json<UserSettings>,
) -> impl IntoResponse {
    info!("Updating settings for session: {}", session_id);
    state.settings.set(&session_id, settings).await;
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "ok".to_string(),
        }),
    )
}

/// GET /settings/:session_id
/// Fetch previously stored preferences
pub async fn get_settings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.settings.get(&session_id).await {
        Some(settings) => (StatusCode::OK, Json(settings)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Settings not found".to_string(),
            }),
        )
            .into_response(),
    }
}
