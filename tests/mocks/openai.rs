//! Mock OpenAI-compatible provider
//!
//! # Example
//!
//! ```rust,ignore
//! let upstream = MockOpenAi::start().await;
//! upstream.mock_stream(&["Hello", "!"]).await;
//! // Use upstream.base_url() as OPENAI_API_URL
//! ```

use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::constants;

pub struct MockOpenAi {
    server: MockServer,
}

impl MockOpenAi {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure as `OPENAI_API_URL`
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// One `chat.completion.chunk` frame carrying `content`
    pub fn chunk(content: &str) -> String {
        let frame = json!({
            "id": "chatcmpl-test123",
            "object": "chat.completion.chunk",
            "created": 1706745600,
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
        });
        format!("data: {}\n\n", frame)
    }

    /// Full stream body: role frame, one frame per fragment, stop frame, `[DONE]`
    pub fn stream_body(fragments: &[&str]) -> String {
        let mut body = String::from(
            "data: {\"id\":\"chatcmpl-test123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"},\"finish_reason\":null}]}\n\n",
        );
        for fragment in fragments {
            body.push_str(&Self::chunk(fragment));
        }
        body.push_str(
            "data: {\"id\":\"chatcmpl-test123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        );
        body.push_str("data: [DONE]\n\n");
        body
    }

    /// Respond to an authenticated streaming request with `body` as SSE
    pub async fn mock_raw_stream(&self, body: String) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header(
                "authorization",
                format!("Bearer {}", constants::TEST_OPENAI_API_KEY).as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_stream(&self, fragments: &[&str]) {
        self.mock_raw_stream(Self::stream_body(fragments)).await;
    }

    /// Reject every request with an OpenAI-style error envelope
    pub async fn mock_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": {
                    "message": message,
                    "type": "invalid_request_error",
                    "code": null
                }
            })))
            .mount(&self.server)
            .await;
    }
}
