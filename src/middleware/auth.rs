//! Authentication middleware
//!
//! Verifies bearer tokens through the configured [`IdentityVerifier`] and
//! hands the verified subject to the chat handlers.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::{collaborators::VerifiedIdentity, error::GatewayError, AppState};

/// Extract the bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Hash a token so it can be logged
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Authentication middleware
///
/// Passes requests through untouched when no verifier is configured.
/// Otherwise requires `Authorization: Bearer <token>`, verifies it and adds
/// [`VerifiedIdentity`] to the request extensions.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let Some(verifier) = state.identity.as_ref() else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| GatewayError::Unauthorized("Missing bearer token".to_string()))?;

    let token_hash = hash_token(token);
    debug!(token_hash = %token_hash, "Verifying bearer token");

    let identity = match verifier.verify_token(token).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(token_hash = %token_hash, error = %e, "Token verification failed");
            return Err(e);
        }
    };

    debug!(subject_id = %identity.subject_id, "Caller authenticated");
    request.extensions_mut().insert::<VerifiedIdentity>(identity);

    Ok(next.run(request).await)
}
