//! Health, metrics and docs endpoint tests
//!
//! - GET /health - Full health check with provider status
//! - GET /health/ready - Readiness probe
//! - GET /health/live - Liveness probe
//! - GET /metrics - Prometheus exposition
//! - GET /docs/openapi.json - OpenAPI document

use axum::http::{HeaderName, HeaderValue, StatusCode};
use chat_gateway::AppState;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{config_from, constants, fake_config, test_server};

#[tokio::test]
async fn test_liveness_always_ok() {
    let server = test_server(AppState::new(config_from(&[])).unwrap());

    let response = server.get("/health/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_reports_configured_providers() {
    let server = test_server(AppState::new(fake_config()).unwrap());

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["providers"]["openai"], true);
    assert_eq!(body["providers"]["anthropic"], true);
    assert_eq!(body["auth_enabled"], false);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_single_provider_is_degraded_but_ready() {
    let config = config_from(&[("OPENAI_API_KEY", constants::TEST_OPENAI_API_KEY)]);
    let server = test_server(AppState::new(config).unwrap());

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    let body: Value = health.json();
    assert_eq!(body["status"], "degraded");

    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_not_ready_without_any_provider() {
    let server = test_server(AppState::new(config_from(&[])).unwrap());

    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = health.json();
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_endpoint_responds() {
    let server = test_server(AppState::new(fake_config()).unwrap());

    let response = server.get("/metrics").await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_docs_guarded_by_docs_key() {
    let config = config_from(&[
        ("OPENAI_API_KEY", constants::TEST_OPENAI_API_KEY),
        ("DOCS_API_KEY", "docs-secret"),
    ]);
    let server = test_server(AppState::new(config).unwrap());

    let hidden = server.get("/docs/openapi.json").await;
    assert_eq!(hidden.status_code(), StatusCode::NOT_FOUND);

    let shown = server
        .get("/docs/openapi.json")
        .add_header(
            HeaderName::from_static("x-docs-key"),
            HeaderValue::from_static("docs-secret"),
        )
        .await;
    assert_eq!(shown.status_code(), StatusCode::OK);
    let doc: Value = shown.json();
    assert!(doc["paths"]["/api/chat/openai"].is_object());
}
