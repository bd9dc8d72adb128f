//! HTTP identity verifier
//!
//! Forwards the caller's bearer token to an identity endpoint and reads the
//! subject back. The endpoint answers 2xx with `{"subjectId": ...}` (or the
//! older `{"uid": ...}`) for a valid token.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use super::{IdentityVerifier, VerifiedIdentity};
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(rename = "subjectId", alias = "uid")]
    subject_id: String,
}

/// Identity verifier backed by an HTTP endpoint
pub struct HttpIdentityVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpIdentityVerifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    #[instrument(skip_all)]
    async fn verify_token(&self, token: &str) -> GatewayResult<VerifiedIdentity> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Identity endpoint unreachable");
                GatewayError::ServiceUnavailable("Identity service unavailable".to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Identity endpoint response status");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Identity verification request failed");
            return Err(GatewayError::ServiceUnavailable(
                "Identity service unavailable".to_string(),
            ));
        }

        let body: VerifyResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse identity response");
            GatewayError::Unauthorized("Token did not resolve to a subject".to_string())
        })?;

        if body.subject_id.is_empty() {
            return Err(GatewayError::Unauthorized(
                "Token did not resolve to a subject".to_string(),
            ));
        }

        Ok(VerifiedIdentity {
            subject_id: body.subject_id,
        })
    }
}
