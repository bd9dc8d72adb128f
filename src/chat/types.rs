//! Core message types for chat requests

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{GatewayError, GatewayResult};

/// Role of a message participant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions or context for the model
    System,
    /// Message from the human
    User,
    /// Earlier model output supplied by the caller
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A chat message with role and text content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Chat request body
///
/// ```json
/// { "messages": [ { "role": "user", "content": "Hello" } ] }
/// ```
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatRequest {
    messages: Vec<Message>,
}

impl ChatRequest {
    /// Build a validated request from messages
    pub fn new(messages: Vec<Message>) -> GatewayResult<Self> {
        let request = Self { messages };
        request.validate()?;
        Ok(request)
    }

    /// Parse and validate a raw JSON body
    pub fn from_slice(body: &[u8]) -> GatewayResult<Self> {
        let request: ChatRequest = serde_json::from_slice(body)
            .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request body: {}", e)))?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> GatewayResult<()> {
        if self.messages.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "messages must contain at least one message".to_string(),
            ));
        }
        Ok(())
    }

    /// Messages in the order the caller supplied them
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
