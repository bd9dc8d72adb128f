//! Stream normalization
//!
//! Maps provider events onto the gateway's single output encoding: the raw
//! bytes of each text fragment, with no framing envelope. Errors never reach
//! the body; they end the output and are handed back to the caller for logging.

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::provider::ProviderEvent;

/// A normalized output item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedChunk {
    /// Bytes to write to the client, exactly one per text delta
    Data(Bytes),
    /// Output ends cleanly
    Done,
    /// Output ends because of an upstream failure; the cause is for logs only
    Failed { cause: String },
}

impl NormalizedChunk {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NormalizedChunk::Data(_))
    }
}

/// Normalize a single provider event
pub fn normalize_event(event: ProviderEvent) -> NormalizedChunk {
    match event {
        ProviderEvent::TextDelta { text } => NormalizedChunk::Data(Bytes::from(text)),
        ProviderEvent::StreamEnd => NormalizedChunk::Done,
        ProviderEvent::StreamError { cause } => NormalizedChunk::Failed { cause },
    }
}

/// Normalize a provider event stream.
///
/// Emits exactly one terminal item and nothing after it. An event stream
/// that runs out without a terminal event is treated as a clean end.
pub fn normalize<S>(events: S) -> impl Stream<Item = NormalizedChunk> + Send
where
    S: Stream<Item = ProviderEvent> + Send + 'static,
{
    async_stream::stream! {
        let mut events = Box::pin(events);
        while let Some(event) = events.next().await {
            let chunk = normalize_event(event);
            let terminal = chunk.is_terminal();
            yield chunk;
            if terminal {
                return;
            }
        }
        yield NormalizedChunk::Done;
    }
}
