//! Session logging
//!
//! Every chat session gets a short trace id so its start, upstream open and
//! terminal outcome can be correlated in the logs.

use std::time::Instant;

use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

use crate::provider::Provider;

use super::SessionOutcome;

/// Context for tracking one chat session through the gateway
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Short identifier for log correlation
    pub trace_id: String,
    pub start_time: Instant,
    pub provider: Provider,
    /// Number of messages the caller supplied
    pub message_count: usize,
    /// Verified subject, when authentication is enabled
    pub subject: Option<String>,
}

impl SessionContext {
    pub fn new(provider: Provider) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(),
            start_time: Instant::now(),
            provider,
            message_count: 0,
            subject: None,
        }
    }

    pub fn with_message_count(mut self, count: usize) -> Self {
        self.message_count = count;
        self
    }

    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    pub fn log_request_start(&self) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            message_count = self.message_count,
            subject = ?self.subject,
            "Chat session started"
        );
    }

    pub fn log_upstream_open(&self) {
        debug!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            elapsed_ms = %self.elapsed_ms(),
            "Upstream stream opened"
        );
    }

    /// Log a failure that happened before any byte was streamed
    pub fn log_open_failure(&self, error: &str) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Failed to open upstream stream"
        );
    }

    /// Log a mid-stream failure; the cause never reaches the client
    pub fn log_stream_error(&self, cause: &str, chunks: u64) {
        warn!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            chunks = chunks,
            elapsed_ms = %self.elapsed_ms(),
            cause = %cause,
            "Upstream stream failed"
        );
    }

    /// Log the terminal state of the session
    pub fn log_outcome(&self, outcome: SessionOutcome, chunks: u64) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            outcome = outcome.as_str(),
            chunks = chunks,
            elapsed_ms = %self.elapsed_ms(),
            subject = ?self.subject,
            "Chat session ended"
        );
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "chat_session",
            trace_id = %self.trace_id,
            provider = %self.provider,
        )
    }
}
