//! Configuration management for the chat gateway
//!
//! Configuration is loaded once from environment variables at process start
//! and treated as read-only afterwards. Provider credentials are optional: a
//! provider without a key is reported as unavailable by its endpoint.

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// OpenAI-compatible API base URL
    pub openai_api_url: String,
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// Model requested from the OpenAI-compatible provider
    pub openai_model: String,

    /// Anthropic-compatible API base URL
    pub anthropic_api_url: String,
    /// Anthropic API key
    pub anthropic_api_key: Option<String>,
    /// Model requested from the Anthropic-compatible provider
    pub anthropic_model: String,
    /// Value of the `anthropic-version` header
    pub anthropic_version: String,
    /// `max_tokens` sent with every Anthropic request (the field is mandatory there)
    pub anthropic_max_tokens: u32,

    /// Connect timeout for upstream providers (in seconds)
    pub upstream_connect_timeout_seconds: u64,

    /// Identity verification endpoint; chat routes are open when unset
    pub identity_verify_url: Option<String>,

    /// Key protecting the OpenAPI document; unprotected when unset
    pub docs_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: or_default("GATEWAY_HOST", "0.0.0.0"),
            port: or_default("GATEWAY_PORT", "8080")
                .parse()
                .context("Invalid GATEWAY_PORT")?,

            openai_api_url: trim_url(or_default("OPENAI_API_URL", "https://api.openai.com/v1")),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: or_default("OPENAI_MODEL", "gpt-4o-mini"),

            anthropic_api_url: trim_url(or_default(
                "ANTHROPIC_API_URL",
                "https://api.anthropic.com/v1",
            )),
            anthropic_api_key: non_empty("ANTHROPIC_API_KEY"),
            anthropic_model: or_default("ANTHROPIC_MODEL", "claude-3-5-sonnet-latest"),
            anthropic_version: or_default("ANTHROPIC_VERSION", "2023-06-01"),
            anthropic_max_tokens: or_default("ANTHROPIC_MAX_TOKENS", "1024")
                .parse()
                .context("Invalid ANTHROPIC_MAX_TOKENS")?,

            upstream_connect_timeout_seconds: or_default("UPSTREAM_CONNECT_TIMEOUT_SECONDS", "10")
                .parse()
                .context("Invalid UPSTREAM_CONNECT_TIMEOUT_SECONDS")?,

            identity_verify_url: non_empty("IDENTITY_VERIFY_URL"),
            docs_api_key: non_empty("DOCS_API_KEY"),
        })
    }

    /// Whether at least one upstream provider has credentials
    pub fn any_provider_configured(&self) -> bool {
        self.openai_api_key.is_some() || self.anthropic_api_key.is_some()
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
