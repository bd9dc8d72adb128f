//! Bearer token verification tests
//!
//! With an identity endpoint configured, chat routes require a verified
//! bearer token; health endpoints stay open.

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use chat_gateway::{provider::ProviderEvent, AppState, HttpIdentityVerifier};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::{
    matchers::{header as match_header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::{constants, delta, fake_config, test_server, user_message, ScriptedFactory};

async fn identity_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/verify"))
        .and(match_header(
            "authorization",
            format!("Bearer {}", constants::TEST_BEARER_TOKEN).as_str(),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"subjectId": constants::TEST_SUBJECT_ID})),
        )
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(401))
        .with_priority(2)
        .mount(&server)
        .await;

    server
}

async fn guarded_gateway(factory: &Arc<ScriptedFactory>) -> (axum_test::TestServer, MockServer) {
    let identity = identity_server().await;
    let verifier = Arc::new(HttpIdentityVerifier::new(
        reqwest::Client::new(),
        format!("{}/verify", identity.uri()),
    ));
    let state = AppState::with_adapters(fake_config(), factory.clone()).with_identity(verifier);
    (test_server(state), identity)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

#[tokio::test]
async fn test_missing_token_rejected_before_adapter() {
    let factory = Arc::new(ScriptedFactory::new(vec![ProviderEvent::StreamEnd]));
    let (server, _identity) = guarded_gateway(&factory).await;

    let response = server
        .post("/api/chat/openai")
        .json(&user_message("Hi"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].is_string());
    assert_eq!(factory.build_count(), 0);
}

#[tokio::test]
async fn test_rejected_token_returns_unauthorized() {
    let factory = Arc::new(ScriptedFactory::new(vec![ProviderEvent::StreamEnd]));
    let (server, _identity) = guarded_gateway(&factory).await;

    let response = server
        .post("/api/chat/anthropic")
        .add_header(header::AUTHORIZATION, bearer("forged-token"))
        .json(&user_message("Hi"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(factory.build_count(), 0);
}

#[tokio::test]
async fn test_unauthorized_even_with_invalid_body() {
    let factory = Arc::new(ScriptedFactory::new(vec![ProviderEvent::StreamEnd]));
    let (server, _identity) = guarded_gateway(&factory).await;

    let response = server
        .post("/api/chat/openai")
        .json(&json!({"messages": []}))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verified_token_streams() {
    let factory = Arc::new(ScriptedFactory::new(vec![
        delta("Welcome"),
        delta(" back"),
        ProviderEvent::StreamEnd,
    ]));
    let (server, _identity) = guarded_gateway(&factory).await;

    let response = server
        .post("/api/chat/openai")
        .add_header(header::AUTHORIZATION, bearer(constants::TEST_BEARER_TOKEN))
        .json(&user_message("Hi"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Welcome back");
    assert_eq!(factory.build_count(), 1);
}

#[tokio::test]
async fn test_health_open_without_token() {
    let factory = Arc::new(ScriptedFactory::new(vec![ProviderEvent::StreamEnd]));
    let (server, _identity) = guarded_gateway(&factory).await;

    let response = server.get("/health/live").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["auth_enabled"], true);
}
