//! Mock upstream providers for testing
//!
//! wiremock servers that speak each provider's streaming protocol:
//! - OpenAI-compatible `POST /v1/chat/completions` (delta-content frames)
//! - Anthropic-compatible `POST /v1/messages` (typed event frames)

pub mod openai;

pub use anthropic::MockAnthropic;
pub use openai::MockOpenAi;
