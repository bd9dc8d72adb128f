//! Health check endpoints
//!
//! Provides endpoints for monitoring and container orchestration:
//! - `/health` - Full health check with provider status
//! - `/health/ready` - Readiness probe
//! - `/health/live` - Liveness probe

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;

/// Health status enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Which provider families have credentials
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderChecks {
    pub openai: bool,
    pub anthropic: bool,
}

/// Full health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub providers: ProviderChecks,
    pub auth_enabled: bool,
}

/// Simple health response for liveness/readiness
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

fn provider_checks(state: &AppState) -> ProviderChecks {
    ProviderChecks {
        openai: state.config.openai_api_key.is_some(),
        anthropic: state.config.anthropic_api_key.is_some(),
    }
}

/// Full health check endpoint
///
/// Healthy when both providers are configured, degraded with one, unhealthy
/// (503) with none.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Gateway can serve at least one provider", body = HealthResponse),
        (status = 503, description = "No provider is configured", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let providers = provider_checks(&state);

    let overall_status = match (providers.openai, providers.anthropic) {
        (true, true) => HealthStatus::Healthy,
        (false, false) => HealthStatus::Unhealthy,
        _ => HealthStatus::Degraded,
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        providers,
        auth_enabled: state.identity.is_some(),
    };

    (status_code, Json(response))
}

/// Readiness probe endpoint
///
/// Ready once at least one provider has credentials.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SimpleHealthResponse>) {
    if !state.config.any_provider_configured() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(SimpleHealthResponse {
                status: HealthStatus::Unhealthy,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: HealthStatus::Healthy,
        }),
    )
}

/// Liveness probe endpoint
pub async fn liveness_check() -> (StatusCode, Json<SimpleHealthResponse>) {
    (
        StatusCode::OK,
        Json(SimpleHealthResponse {
            status: HealthStatus::Healthy,
        }),
    )
}
