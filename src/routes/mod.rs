//! HTTP routes for the chat gateway
//!
//! This module defines all HTTP endpoints exposed by the gateway.

pub mod chat;
pub mod docs;
pub mod health;
pub mod metrics;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{middleware::auth::auth_middleware, AppState};

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browsers call the chat endpoints directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth is a pass-through when no identity verifier is configured
    let chat_routes = Router::new()
        .route("/api/chat/openai", post(chat::openai_chat))
        .route("/api/chat/anthropic", post(chat::anthropic_chat))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics));

    // No compression layer: it would hold back streamed chunks
    Router::new()
        .merge(public_routes)
        .merge(chat_routes)
        .merge(docs::create_docs_router(state.config.docs_api_key.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
