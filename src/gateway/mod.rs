//! Gateway session lifecycle
//!
//! A [`GatewaySession`] owns one opened upstream event stream and relays it
//! to the client body through a bounded channel. The relay runs in its own
//! task and watches the channel for closure, so a client that goes away is
//! noticed even while the upstream is silent. On every exit path the upstream
//! stream is dropped, which releases its connection.

pub mod logging;

use std::convert::Infallible;

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::Instrument;

use crate::{
    provider::EventStream,
    routes::metrics,
    streaming::{normalize, NormalizedChunk},
};

pub use logging::SessionContext;

/// Chunks buffered between the relay task and the response body
const RELAY_BUFFER: usize = 16;

/// Terminal state of a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Upstream signalled the end of generation
    Completed,
    /// Client disconnected before the end
    Aborted,
    /// Upstream failed after streaming began
    Failed,
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Aborted => "aborted",
            SessionOutcome::Failed => "failed",
        }
    }
}

/// One streaming chat session, from an opened upstream to a closed body
pub struct GatewaySession {
    context: SessionContext,
    events: EventStream,
}

impl GatewaySession {
    pub fn new(context: SessionContext, events: EventStream) -> Self {
        Self { context, events }
    }

    /// Spawn the relay and return the client body with a handle to the outcome
    pub fn start(self) -> (Body, JoinHandle<SessionOutcome>) {
        let (tx, mut rx) = mpsc::channel::<Bytes>(RELAY_BUFFER);
        let span = self.context.create_span();
        let handle = tokio::spawn(relay(self.context, self.events, tx).instrument(span));

        let body = Body::from_stream(async_stream::stream! {
            while let Some(bytes) = rx.recv().await {
                yield Ok::<_, Infallible>(bytes);
            }
        });

        (body, handle)
    }

    /// Start the session and wrap its body in streaming response headers
    pub fn into_response(self) -> Response {
        let (body, _outcome) = self.start();
        streaming_response(body)
    }
}

/// Response carrying a live stream
pub fn streaming_response(body: Body) -> Response {
    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    // Stops nginx-style proxies from holding chunks back
    headers.insert("x-accel-buffering", HeaderValue::from_static("no"));
    response
}

async fn relay(
    context: SessionContext,
    events: EventStream,
    tx: mpsc::Sender<Bytes>,
) -> SessionOutcome {
    let mut normalized = Box::pin(normalize(events));
    let mut chunks: u64 = 0;

    let outcome = loop {
        tokio::select! {
            biased;

            _ = tx.closed() => break SessionOutcome::Aborted,

            item = normalized.next() => match item {
                Some(NormalizedChunk::Data(bytes)) => {
                    if tx.send(bytes).await.is_err() {
                        break SessionOutcome::Aborted;
                    }
                    chunks += 1;
                }
                Some(NormalizedChunk::Done) | None => break SessionOutcome::Completed,
                Some(NormalizedChunk::Failed { cause }) => {
                    context.log_stream_error(&cause, chunks);
                    break SessionOutcome::Failed;
                }
            },
        }
    };

    // Release the upstream connection before bookkeeping
    drop(normalized);
    drop(tx);

    context.log_outcome(outcome, chunks);
    metrics::record_session(
        context.provider.name(),
        outcome.as_str(),
        chunks,
        context.start_time.elapsed().as_secs_f64(),
    );

    outcome
}
