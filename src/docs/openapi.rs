//! OpenAPI document for the gateway

use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    chat::{ChatRequest, Message, Role},
    error::ErrorResponse,
    routes::health::{HealthResponse, HealthStatus, ProviderChecks},
};

/// OpenAPI specification for the chat gateway
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat Gateway API",
        version = "1.0.0",
        description = "Streams chat completions from OpenAI- and Anthropic-compatible providers as raw text"
    ),
    paths(
        crate::routes::chat::openai_chat,
        crate::routes::chat::anthropic_chat,
        crate::routes::health::health_check
    ),
    components(
        schemas(
            Role,
            Message,
            ChatRequest,
            ErrorResponse,
            HealthStatus,
            ProviderChecks,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Chat", description = "Streaming chat endpoints"),
        (name = "Health", description = "Service health")
    )
)]
pub struct GatewayApiDoc;

/// Bearer scheme used when identity verification is enabled
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
