use super::handlers;
use super::state::AppState;
use super::ws;
use crate::config::HttpConfig;
use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, http_config: &HttpConfig) -> Result<Router> {
    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:session_id", get(handlers::get_session_stats))
        .route("/sessions/:session_id/end", post(handlers::end_session))
        // Accessibility settings
        .route(
            "/settings/:session_id",
            post(handlers::set_settings).get(handlers::get_settings),
        )
        // Streaming attachments
        .route("/ws/audio/:session_id", get(ws::audio_ws))
        .route("/ws/summary/:session_id", get(ws::summary_ws))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&http_config.allowed_origins)?)
        .with_state(state);
    Ok(router)
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
