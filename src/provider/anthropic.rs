//! Anthropic-compatible adapter (typed-event protocol)
//!
//! Upstream frames are typed (`message_start`, `content_block_start`,
//! `content_block_delta`, `ping`, `message_delta`, `message_stop`, `error`).
//! Only `content_block_delta` frames carrying a `text_delta` produce text;
//! everything else is ignored until `message_stop` or an `error` frame.
//!
//! Anthropic has no `system` role in its message list and rejects a
//! conversation that opens with the assistant or repeats a role, so messages
//! are mapped before sending:
//! - system messages are joined into the top-level `system` field
//! - consecutive messages from the same role are merged
//! - the first remaining message must be from the user

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{headers, log_excerpt, open_stream, ChatAdapter, EventStream, Provider, ProviderEvent};
use crate::{
    chat::{ChatRequest, Message, Role},
    config::Config,
    error::{GatewayError, GatewayResult},
    streaming::{sse_events, SseFrame},
};

/// Connection settings for an Anthropic-compatible provider
#[derive(Debug, Clone)]
pub struct AnthropicSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub version: String,
    pub max_tokens: u32,
}

impl AnthropicSettings {
    /// Settings from configuration, `None` when no API key is set
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.anthropic_api_key.clone()?;
        Some(Self {
            base_url: config.anthropic_api_url.clone(),
            api_key,
            model: config.anthropic_model.clone(),
            version: config.anthropic_version.clone(),
            max_tokens: config.anthropic_max_tokens,
        })
    }
}

/// Upstream request body for `/messages`
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    stream: bool,
}

/// A message in Anthropic's vocabulary (`user` or `assistant` only)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnthropicMessage {
    pub role: &'static str,
    pub content: String,
}

/// Result of mapping a chat request onto Anthropic's roles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedConversation {
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
}

/// Map caller messages onto Anthropic's role vocabulary.
///
/// Fails with [`GatewayError::InvalidRequest`] when nothing but system
/// messages remain, or when the conversation opens with the assistant.
pub fn map_messages(messages: &[Message]) -> GatewayResult<MappedConversation> {
    let mut system_texts: Vec<&str> = Vec::new();
    let mut mapped: Vec<AnthropicMessage> = Vec::new();

    for message in messages {
        let role = match message.role {
            Role::System => {
                system_texts.push(&message.content);
                continue;
            }
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        match mapped.last_mut() {
            Some(previous) if previous.role == role => {
                previous.content.push_str("\n\n");
                previous.content.push_str(&message.content);
            }
            _ => mapped.push(AnthropicMessage {
                role,
                content: message.content.clone(),
            }),
        }
    }

    match mapped.first() {
        None => {
            return Err(GatewayError::InvalidRequest(
                "Conversation must contain at least one user message".to_string(),
            ))
        }
        Some(first) if first.role != "user" => {
            return Err(GatewayError::InvalidRequest(
                "First non-system message must be from user role".to_string(),
            ))
        }
        Some(_) => {}
    }

    let system = if system_texts.is_empty() {
        None
    } else {
        Some(system_texts.join("\n"))
    };

    Ok(MappedConversation {
        system,
        messages: mapped,
    })
}

/// Typed stream frame, reduced to the variants the gateway acts on
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamFrame {
    ContentBlockDelta { delta: BlockDelta },
    MessageStop,
    Error { error: ErrorDetail },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BlockDelta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    message: String,
}

/// Map one SSE frame to at most one provider event
pub fn extract_event(frame: &SseFrame) -> Option<ProviderEvent> {
    let data = frame.data.trim();
    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamFrame>(data) {
        Ok(StreamFrame::ContentBlockDelta {
            delta: BlockDelta::TextDelta { text },
        }) if !text.is_empty() => Some(ProviderEvent::TextDelta { text }),
        Ok(StreamFrame::MessageStop) => Some(ProviderEvent::StreamEnd),
        Ok(StreamFrame::Error { error }) => Some(ProviderEvent::StreamError {
            cause: match error.error_type {
                Some(kind) => format!("{}: {}", kind, error.message),
                None => error.message,
            },
        }),
        Ok(_) => {
            debug!(event = ?frame.event, "Ignoring non-content Anthropic frame");
            None
        }
        Err(e) => {
            warn!(
                error = %e,
                sse_data = %log_excerpt(data),
                "Skipping unparseable Anthropic stream frame"
            );
            None
        }
    }
}

/// Adapter for `/messages` streaming
pub struct AnthropicAdapter {
    client: reqwest::Client,
    settings: Arc<AnthropicSettings>,
}

impl AnthropicAdapter {
    pub fn new(client: reqwest::Client, settings: Arc<AnthropicSettings>) -> Self {
        Self { client, settings }
    }

    fn build_body(&self, request: &ChatRequest) -> GatewayResult<MessagesRequest<'_>> {
        let conversation = map_messages(request.messages())?;
        Ok(MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            system: conversation.system,
            messages: conversation.messages,
            stream: true,
        })
    }
}

#[async_trait]
impl ChatAdapter for AnthropicAdapter {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    #[instrument(skip_all, fields(provider = "anthropic", model = %self.settings.model))]
    async fn open(&self, request: &ChatRequest) -> GatewayResult<EventStream> {
        // Mapping failures are caught before any connection is made
        let body = self.build_body(request)?;
        let url = format!("{}/messages", self.settings.base_url);

        let builder = self
            .client
            .post(&url)
            .headers(headers::anthropic_headers(
                &self.settings.api_key,
                &self.settings.version,
            )?)
            .json(&body);

        let response = open_stream(Provider::Anthropic, builder).await?;
        Ok(sse_events(response.bytes_stream(), extract_event))
    }
}
