//! Header construction for upstream provider requests
//!
//! Client headers are never forwarded upstream. Each request carries only the
//! provider credential and the content negotiation headers built here.

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::GatewayResult;

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    headers
}

/// Headers for OpenAI-compatible providers (bearer authentication)
pub fn openai_headers(api_key: &str) -> GatewayResult<HeaderMap> {
    let mut headers = base_headers();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key)).context("Invalid OpenAI API key")?,
    );
    Ok(headers)
}

/// Headers for Anthropic-compatible providers (`x-api-key` authentication)
pub fn anthropic_headers(api_key: &str, version: &str) -> GatewayResult<HeaderMap> {
    let mut headers = base_headers();
    headers.insert(
        "x-api-key",
        HeaderValue::from_str(api_key).context("Invalid Anthropic API key")?,
    );
    headers.insert(
        "anthropic-version",
        HeaderValue::from_str(version).context("Invalid Anthropic version")?,
    );
    Ok(headers)
}
