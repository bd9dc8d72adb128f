//! Error types for the chat gateway
//!
//! Only failures that happen before a response is committed live here.
//! Once a streaming body has started, upstream faults travel as
//! [`ProviderEvent::StreamError`](crate::provider::ProviderEvent) instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::provider::Provider;

/// Gateway-level errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or empty body, or messages the provider cannot represent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The upstream call could not be opened (refused, rejected, non-2xx)
    #[error("{provider} request failed: {message}")]
    UpstreamOpen {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// Build an upstream open failure
    pub fn upstream_open(
        provider: Provider,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::UpstreamOpen {
            provider,
            status,
            message: message.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::UpstreamOpen { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            GatewayError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Result type alias for convenience
pub type GatewayResult<T> = Result<T, GatewayError>;
