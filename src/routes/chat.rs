//! Streaming chat endpoints
//!
//! `POST /api/chat/openai` and `POST /api/chat/anthropic` accept
//! `{"messages": [...]}` and stream the generated text back as raw bytes.
//! Nothing is written until the upstream stream is open; failures before that
//! point are a single JSON error.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::Response, Extension};
use tracing::{instrument, warn};

use crate::{
    chat::ChatRequest,
    collaborators::VerifiedIdentity,
    error::{ErrorResponse, GatewayError, GatewayResult},
    gateway::{GatewaySession, SessionContext},
    provider::Provider,
    routes::metrics,
    AppState,
};

/// Stream a chat completion from an OpenAI-compatible provider
#[utoipa::path(
    post,
    path = "/api/chat/openai",
    tag = "Chat",
    request_body(content = ChatRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Generated text, streamed as it arrives", content_type = "text/event-stream", body = String),
        (status = 400, description = "Malformed body or empty message list", body = ErrorResponse),
        (status = 401, description = "Missing or rejected bearer token", body = ErrorResponse),
        (status = 502, description = "Upstream refused or failed to open the stream", body = ErrorResponse),
        (status = 503, description = "Provider not configured", body = ErrorResponse)
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn openai_chat(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<VerifiedIdentity>>,
    body: Bytes,
) -> GatewayResult<Response> {
    stream_chat(&state, Provider::OpenAi, identity.map(|Extension(i)| i), &body).await
}

/// Stream a chat completion from an Anthropic-compatible provider
///
/// System messages become the provider's system prompt; the first remaining
/// message must be from the user.
#[utoipa::path(
    post,
    path = "/api/chat/anthropic",
    tag = "Chat",
    request_body(content = ChatRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Generated text, streamed as it arrives", content_type = "text/event-stream", body = String),
        (status = 400, description = "Malformed body, empty message list or unmappable roles", body = ErrorResponse),
        (status = 401, description = "Missing or rejected bearer token", body = ErrorResponse),
        (status = 502, description = "Upstream refused or failed to open the stream", body = ErrorResponse),
        (status = 503, description = "Provider not configured", body = ErrorResponse)
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn anthropic_chat(
    State(state): State<Arc<AppState>>,
    identity: Option<Extension<VerifiedIdentity>>,
    body: Bytes,
) -> GatewayResult<Response> {
    stream_chat(&state, Provider::Anthropic, identity.map(|Extension(i)| i), &body).await
}

/// Validate, open the upstream and hand the stream to a session
#[instrument(skip_all, fields(provider = %provider))]
async fn stream_chat(
    state: &AppState,
    provider: Provider,
    identity: Option<VerifiedIdentity>,
    body: &[u8],
) -> GatewayResult<Response> {
    let request = ChatRequest::from_slice(body).map_err(|e| {
        warn!(error = %e, "Rejected chat request");
        e
    })?;

    let context = SessionContext::new(provider)
        .with_message_count(request.messages().len())
        .with_subject(identity.map(|i| i.subject_id));
    context.log_request_start();

    let adapter = state.adapters.build(provider).map_err(|e| {
        context.log_open_failure(&e.to_string());
        e
    })?;

    let events = match adapter.open(&request).await {
        Ok(events) => events,
        Err(e) => {
            context.log_open_failure(&e.to_string());
            if matches!(e, GatewayError::UpstreamOpen { .. }) {
                metrics::record_open_failure(provider.name());
            }
            return Err(e);
        }
    };
    context.log_upstream_open();

    Ok(GatewaySession::new(context, events).into_response())
}
