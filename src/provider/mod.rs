//! Upstream provider adapters
//!
//! Each provider family gets one [`ChatAdapter`] that opens a streaming
//! completion call and translates the provider's wire format into a uniform
//! [`ProviderEvent`] stream. The set of families is closed ([`Provider`]); the
//! gateway picks an adapter through an [`AdapterFactory`].

pub mod anthropic;
pub mod headers;
pub mod openai;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    chat::ChatRequest,
    config::Config,
    error::{GatewayError, GatewayResult},
};

pub use anthropic::{AnthropicAdapter, AnthropicSettings};
pub use openai::{OpenAiAdapter, OpenAiSettings};

/// Incremental event produced by an adapter during generation.
///
/// A stream carries zero or more `TextDelta`s followed by exactly one
/// `StreamEnd` or `StreamError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// A non-empty fragment of generated text
    TextDelta { text: String },
    /// Generation finished normally
    StreamEnd,
    /// Generation failed after the stream was opened
    StreamError { cause: String },
}

impl ProviderEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProviderEvent::TextDelta { .. })
    }
}

/// Lazy, finite, non-restartable sequence of provider events
pub type EventStream = Pin<Box<dyn Stream<Item = ProviderEvent> + Send>>;

/// Supported upstream provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Delta-content protocol (`/chat/completions`)
    OpenAi,
    /// Typed-event protocol (`/messages`)
    Anthropic,
}

impl Provider {
    /// Provider name for logging and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability shared by all provider adapters
///
/// `open` resolves once the upstream has accepted the request (2xx). Failures
/// up to that point are returned as errors; anything later arrives in the
/// stream as [`ProviderEvent::StreamError`].
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    async fn open(&self, request: &ChatRequest) -> GatewayResult<EventStream>;
}

/// Constructs the adapter for a provider family
pub trait AdapterFactory: Send + Sync {
    fn build(&self, provider: Provider) -> GatewayResult<Box<dyn ChatAdapter>>;
}

/// Factory for the real HTTP adapters
///
/// Settings are captured once from [`Config`] and handed to each adapter at
/// construction time.
pub struct HttpAdapterFactory {
    client: reqwest::Client,
    openai: Option<Arc<OpenAiSettings>>,
    anthropic: Option<Arc<AnthropicSettings>>,
}

impl HttpAdapterFactory {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            openai: OpenAiSettings::from_config(config).map(Arc::new),
            anthropic: AnthropicSettings::from_config(config).map(Arc::new),
        }
    }
}

impl AdapterFactory for HttpAdapterFactory {
    fn build(&self, provider: Provider) -> GatewayResult<Box<dyn ChatAdapter>> {
        let not_configured =
            || GatewayError::ServiceUnavailable(format!("{} provider is not configured", provider));

        match provider {
            Provider::OpenAi => {
                let settings = self.openai.clone().ok_or_else(not_configured)?;
                Ok(Box::new(OpenAiAdapter::new(self.client.clone(), settings)))
            }
            Provider::Anthropic => {
                let settings = self.anthropic.clone().ok_or_else(not_configured)?;
                Ok(Box::new(AnthropicAdapter::new(self.client.clone(), settings)))
            }
        }
    }
}

/// Truncate upstream payloads before they go into logs
pub(crate) fn log_excerpt(data: &str) -> &str {
    const MAX_LOG_CHARS: usize = 500;
    match data.char_indices().nth(MAX_LOG_CHARS) {
        Some((end, _)) => &data[..end],
        None => data,
    }
}

/// Error envelope both provider families use for non-2xx responses
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

/// Send a streaming request and wait for the upstream handshake.
///
/// Connection failures and non-2xx statuses become
/// [`GatewayError::UpstreamOpen`]; the upstream body is logged, and only its
/// `error.message` (or the status reason) is carried into the error.
pub(crate) async fn open_stream(
    provider: Provider,
    request: reqwest::RequestBuilder,
) -> GatewayResult<reqwest::Response> {
    let response = request.send().await.map_err(|e| {
        error!(provider = %provider, error = %e, "Failed to reach upstream provider");
        GatewayError::upstream_open(provider, None, e.to_string())
    })?;

    let status = response.status();
    debug!(provider = %provider, status = %status, "Upstream handshake status");

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        error!(
            provider = %provider,
            status = %status,
            body = %log_excerpt(&text),
            "Upstream rejected request"
        );

        let message = serde_json::from_str::<UpstreamErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });

        return Err(GatewayError::upstream_open(
            provider,
            Some(status.as_u16()),
            format!("{} ({})", message, status.as_u16()),
        ));
    }

    Ok(response)
}
