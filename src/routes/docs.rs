//! Documentation endpoint
//!
//! Serves the OpenAPI document at `/docs/openapi.json`. When a docs key is
//! configured the endpoint answers 404 unless `X-Docs-Key` matches.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use utoipa::OpenApi;

use crate::docs::GatewayApiDoc;

/// Header carrying the docs key
pub const DOCS_KEY_HEADER: &str = "x-docs-key";

/// Gate docs behind the configured key; no key means open access
pub async fn docs_auth_middleware(
    State(expected): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(DOCS_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected.as_str()) {
        next.run(request).await
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(GatewayApiDoc::openapi())
}

/// Create the docs router
///
/// Generic over the outer state so it merges into any router.
pub fn create_docs_router<S>(docs_key: Option<String>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/docs/openapi.json", get(openapi_json))
        .layer(axum::middleware::from_fn_with_state(
            docs_key,
            docs_auth_middleware,
        ))
}
