//! Chat Gateway - streaming proxy for hosted LLM providers
//!
//! Accepts a chat request from the browser, opens a streaming completion with
//! an OpenAI- or Anthropic-compatible provider and relays the generated text
//! back as one plain byte stream.

pub mod chat;
pub mod collaborators;
pub mod config;
pub mod docs;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod provider;
pub mod routes;
pub mod streaming;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

pub use crate::collaborators::{HttpIdentityVerifier, IdentityVerifier};
pub use crate::config::Config;
pub use crate::provider::{AdapterFactory, HttpAdapterFactory};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    /// Builds the adapter for each session
    pub adapters: Arc<dyn AdapterFactory>,
    /// Bearer token verification, `None` leaves the chat routes open
    pub identity: Option<Arc<dyn IdentityVerifier>>,
}

impl AppState {
    /// Create application state with the real HTTP adapters
    pub fn new(config: Config) -> Result<Self> {
        // No overall timeout: a generation may legitimately stream for minutes
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_secs(config.upstream_connect_timeout_seconds))
            .build()?;

        let adapters: Arc<dyn AdapterFactory> =
            Arc::new(HttpAdapterFactory::new(http_client.clone(), &config));

        let identity = config.identity_verify_url.as_ref().map(|url| {
            Arc::new(HttpIdentityVerifier::new(http_client.clone(), url.clone()))
                as Arc<dyn IdentityVerifier>
        });

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            adapters,
            identity,
        })
    }

    /// Create application state around a caller-supplied adapter factory
    pub fn with_adapters(config: Config, adapters: Arc<dyn AdapterFactory>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            start_time: Instant::now(),
            adapters,
            identity: None,
        }
    }

    /// Replace the identity verifier
    pub fn with_identity(mut self, identity: Arc<dyn IdentityVerifier>) -> Self {
        self.identity = Some(identity);
        self
    }
}
