//! Common test utilities for the chat gateway
//!
//! Shared configuration builders, a scripted adapter factory that counts how
//! often it is asked for an adapter, and helpers to stand up the router.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use axum_test::TestServer;
use chat_gateway::{
    chat::ChatRequest,
    error::GatewayResult,
    provider::{AdapterFactory, ChatAdapter, EventStream, Provider, ProviderEvent},
    routes::create_router,
    AppState, Config,
};

/// Test configuration constants
pub mod constants {
    pub const TEST_OPENAI_API_KEY: &str = "test-openai-api-key";
    pub const TEST_ANTHROPIC_API_KEY: &str = "test-anthropic-api-key";
    pub const TEST_BEARER_TOKEN: &str = "test-bearer-token";
    pub const TEST_SUBJECT_ID: &str = "coach_123";
}

/// Build a config from explicit variables only, ignoring the process env
pub fn config_from(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_source(|key| vars.get(key).cloned()).expect("test config should parse")
}

/// Config with both providers pointing at the given base URLs
pub fn provider_config(openai_url: &str, anthropic_url: &str) -> Config {
    config_from(&[
        ("OPENAI_API_URL", openai_url),
        ("OPENAI_API_KEY", constants::TEST_OPENAI_API_KEY),
        ("ANTHROPIC_API_URL", anthropic_url),
        ("ANTHROPIC_API_KEY", constants::TEST_ANTHROPIC_API_KEY),
    ])
}

/// Config with both providers keyed but unreachable; for fake adapters
pub fn fake_config() -> Config {
    provider_config("http://127.0.0.1:9", "http://127.0.0.1:9")
}

/// Test server over the full router
pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(create_router(Arc::new(state))).expect("test server should start")
}

/// Sets a flag when dropped; stands in for an upstream connection
pub struct ReleaseGuard(pub Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Adapter factory that replays a fixed event script and counts builds
pub struct ScriptedFactory {
    builds: AtomicUsize,
    script: Vec<ProviderEvent>,
    stall_after_script: bool,
    released: Arc<AtomicBool>,
    seen_messages: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(script: Vec<ProviderEvent>) -> Self {
        Self {
            builds: AtomicUsize::new(0),
            script,
            stall_after_script: false,
            released: Arc::new(AtomicBool::new(false)),
            seen_messages: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Keep the stream open forever after the script runs out
    pub fn stalling(mut self) -> Self {
        self.stall_after_script = true;
        self
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// True once the adapter's event stream has been dropped
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Number of messages in the last opened request
    pub fn seen_messages(&self) -> usize {
        self.seen_messages.load(Ordering::SeqCst)
    }
}

impl AdapterFactory for ScriptedFactory {
    fn build(&self, provider: Provider) -> GatewayResult<Box<dyn ChatAdapter>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedAdapter {
            provider,
            script: self.script.clone(),
            stall_after_script: self.stall_after_script,
            released: self.released.clone(),
            seen_messages: self.seen_messages.clone(),
        }))
    }
}

struct ScriptedAdapter {
    provider: Provider,
    script: Vec<ProviderEvent>,
    stall_after_script: bool,
    released: Arc<AtomicBool>,
    seen_messages: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatAdapter for ScriptedAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn open(&self, request: &ChatRequest) -> GatewayResult<EventStream> {
        self.seen_messages
            .store(request.messages().len(), Ordering::SeqCst);

        let script = self.script.clone();
        let stall = self.stall_after_script;
        let guard = ReleaseGuard(self.released.clone());

        Ok(Box::pin(async_stream::stream! {
            let _guard = guard;
            for event in script {
                yield event;
            }
            if stall {
                futures::future::pending::<()>().await;
            }
        }))
    }
}

pub fn delta(text: &str) -> ProviderEvent {
    ProviderEvent::TextDelta {
        text: text.to_string(),
    }
}

pub fn user_message(content: &str) -> serde_json::Value {
    serde_json::json!({"messages": [{"role": "user", "content": content}]})
}
