// Integration tests for the REST surface
//
// These tests drive the router directly with tower's oneshot, covering
// session control, stats, idempotent end and the settings endpoints.

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use echonotes::config::{HttpConfig, PipelineConfig};
use echonotes::{
    create_router, AccessibilitySummary, AppState, PipelineSupervisor, SettingsStore, Summarizer,
    Transcriber,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct NullTranscriber;

#[async_trait]
impl Transcriber for NullTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        Ok(String::new())
    }
}

struct NullSummarizer;

#[async_trait]
impl Summarizer for NullSummarizer {
    async fn summarize(&self, _context: &str) -> Result<AccessibilitySummary> {
        Ok(AccessibilitySummary::default())
    }
}

fn test_app() -> Result<(Router, Arc<PipelineSupervisor>)> {
    let config = PipelineConfig {
        poll_batch: 10,
        poll_wait_ms: 50,
        restart_backoff_ms: 50,
        buffer_max_bytes: 2000,
    };
    let supervisor = Arc::new(PipelineSupervisor::new(
        config,
        Arc::new(NullTranscriber),
        Arc::new(NullSummarizer),
    ));
    let state = AppState::new(supervisor.clone(), Arc::new(SettingsStore::new()));
    let http_config = HttpConfig {
        bind: "127.0.0.1".to_string(),
        port: 0,
        allowed_origins: vec!["*".to_string()],
    };
    let router = create_router(state, &http_config)?;
    Ok((router, supervisor))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_health_reports_ok_and_session_count() -> Result<()> {
    let (app, supervisor) = test_app()?;

    let response = app.clone().oneshot(get("/health")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 0);

    app.clone()
        .oneshot(post_json("/sessions", json!({ "session_id": "alive" })))
        .await?;
    let response = app.oneshot(get("/health")).await?;
    let body = json_body(response).await?;
    assert_eq!(body["sessions"], 1);

    supervisor.shutdown_all().await;
    Ok(())
}

#[tokio::test]
async fn test_create_session_generates_an_id() -> Result<()> {
    let (app, supervisor) = test_app()?;

    // No body at all is fine
    let response = app.clone().oneshot(post_empty("/sessions")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    let session_id = body["session_id"].as_str().expect("session_id is a string");
    assert!(
        session_id.starts_with("session-"),
        "Generated id should be prefixed, got {}",
        session_id
    );
    assert_eq!(body["status"], "running");

    // A provided id is echoed back
    let response = app
        .oneshot(post_json("/sessions", json!({ "session_id": "my-lecture" })))
        .await?;
    let body = json_body(response).await?;
    assert_eq!(body["session_id"], "my-lecture");

    supervisor.shutdown_all().await;
    Ok(())
}

#[tokio::test]
async fn test_session_stats_require_a_running_session() -> Result<()> {
    let (app, supervisor) = test_app()?;

    let response = app.clone().oneshot(get("/sessions/ghost")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await?;
    assert!(body["error"].as_str().unwrap().contains("ghost"));

    app.clone()
        .oneshot(post_json("/sessions", json!({ "session_id": "lec" })))
        .await?;
    let response = app.oneshot(get("/sessions/lec")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    assert_eq!(body["session_id"], "lec");
    assert_eq!(body["is_running"], true);
    assert_eq!(body["audio_entries"], 0);
    assert_eq!(body["viewers"], 0);

    supervisor.shutdown_all().await;
    Ok(())
}

#[tokio::test]
async fn test_end_session_is_idempotent_over_http() -> Result<()> {
    let (app, supervisor) = test_app()?;

    app.clone()
        .oneshot(post_json("/sessions", json!({ "session_id": "short" })))
        .await?;

    let response = app.clone().oneshot(post_empty("/sessions/short/end")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["status"], "ok");

    let response = app.clone().oneshot(get("/sessions/short")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Ending again, or ending something that never ran, still reports ok
    let response = app.clone().oneshot(post_empty("/sessions/short/end")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.oneshot(post_empty("/sessions/never/end")).await?;
    assert_eq!(json_body(response).await?["status"], "ok");

    supervisor.shutdown_all().await;
    Ok(())
}

#[tokio::test]
async fn test_settings_round_trip() -> Result<()> {
    let (app, _supervisor) = test_app()?;

    let response = app.clone().oneshot(get("/settings/nobody")).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await?["error"], "Settings not found");

    let payload = json!({
        "difficulty": "very simple",
        "profile": ["dyslexia", "hearing_impairment"]
    });
    let response = app
        .clone()
        .oneshot(post_json("/settings/student-1", payload.clone()))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["status"], "ok");

    let response = app.oneshot(get("/settings/student-1")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?, payload);
    Ok(())
}

#[tokio::test]
async fn test_settings_defaults_fill_missing_fields() -> Result<()> {
    let (app, _supervisor) = test_app()?;

    app.clone()
        .oneshot(post_json("/settings/student-2", json!({})))
        .await?;

    let response = app.oneshot(get("/settings/student-2")).await?;
    let body = json_body(response).await?;
    assert_eq!(body["difficulty"], "simple");
    assert_eq!(body["profile"], json!([]));
    Ok(())
}
