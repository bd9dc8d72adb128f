//! OpenAI-compatible adapter (delta-content protocol)
//!
//! Every upstream frame is a `chat.completion.chunk` whose first choice may
//! carry a `delta.content` fragment. `data: [DONE]` marks completion.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::{headers, log_excerpt, open_stream, ChatAdapter, EventStream, Provider, ProviderEvent};
use crate::{
    chat::ChatRequest,
    config::Config,
    error::GatewayResult,
    streaming::{sse_events, SseFrame},
};

/// Connection settings for an OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl OpenAiSettings {
    /// Settings from configuration, `None` when no API key is set
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.openai_api_key.clone()?;
        Some(Self {
            base_url: config.openai_api_url.clone(),
            api_key,
            model: config.openai_model.clone(),
        })
    }
}

/// Upstream request body
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<UpstreamMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct UpstreamMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Streaming chunk, reduced to the fields the gateway reads
#[derive(Debug, Deserialize)]
struct ChunkFrame {
    #[serde(default)]
    choices: Vec<ChoiceFrame>,
    #[serde(default)]
    error: Option<ErrorFrame>,
}

#[derive(Debug, Deserialize, Default)]
struct ChoiceFrame {
    #[serde(default)]
    delta: DeltaFrame,
}

#[derive(Debug, Deserialize, Default)]
struct DeltaFrame {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorFrame {
    message: String,
}

/// Adapter for `/chat/completions` streaming
pub struct OpenAiAdapter {
    client: reqwest::Client,
    settings: Arc<OpenAiSettings>,
}

impl OpenAiAdapter {
    pub fn new(client: reqwest::Client, settings: Arc<OpenAiSettings>) -> Self {
        Self { client, settings }
    }

    fn build_body<'a>(&'a self, request: &'a ChatRequest) -> CompletionRequest<'a> {
        // All three roles exist natively, no mapping needed
        let messages = request
            .messages()
            .iter()
            .map(|m| UpstreamMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();

        CompletionRequest {
            model: &self.settings.model,
            messages,
            stream: true,
        }
    }
}

/// Map one SSE frame to at most one provider event
pub fn extract_event(frame: &SseFrame) -> Option<ProviderEvent> {
    let data = frame.data.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(ProviderEvent::StreamEnd);
    }

    let chunk: ChunkFrame = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(
                error = %e,
                sse_data = %log_excerpt(data),
                "Skipping unparseable OpenAI stream frame"
            );
            return None;
        }
    };

    if let Some(error) = chunk.error {
        return Some(ProviderEvent::StreamError {
            cause: error.message,
        });
    }

    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty())
        .map(|text| ProviderEvent::TextDelta { text })
}

#[async_trait]
impl ChatAdapter for OpenAiAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    #[instrument(skip_all, fields(provider = "openai", model = %self.settings.model))]
    async fn open(&self, request: &ChatRequest) -> GatewayResult<EventStream> {
        let url = format!("{}/chat/completions", self.settings.base_url);
        let body = self.build_body(request);

        let builder = self
            .client
            .post(&url)
            .headers(headers::openai_headers(&self.settings.api_key)?)
            .json(&body);

        let response = open_stream(Provider::OpenAi, builder).await?;
        Ok(sse_events(response.bytes_stream(), extract_event))
    }
}
