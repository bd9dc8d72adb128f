//! SSE (Server-Sent Events) decoding and output normalization
//!
//! Upstream providers deliver their token streams as SSE. [`SseFrameBuffer`]
//! turns arbitrarily split byte chunks into complete frames, and
//! [`sse_events`] drives a provider-specific frame extractor over an upstream
//! body to produce [`ProviderEvent`]s.

pub mod normalize;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;

use crate::provider::{EventStream, ProviderEvent};

pub use normalize::{normalize, normalize_event, NormalizedChunk};

/// One dispatched SSE frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if any
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
}

/// Buffer for assembling SSE frames across chunk boundaries.
///
/// Bytes are held until a full line is available, so multi-byte UTF-8
/// sequences split between network chunks decode correctly. A frame is
/// dispatched on a blank line.
///
/// # Example
/// ```
/// use chat_gateway::streaming::SseFrameBuffer;
///
/// let mut buffer = SseFrameBuffer::new();
///
/// let frames = buffer.feed(b"event: ping\ndata: {\"type\":");
/// assert!(frames.is_empty());
///
/// let frames = buffer.feed(b"\"ping\"}\n\n");
/// assert_eq!(frames.len(), 1);
/// assert_eq!(frames[0].event.as_deref(), Some("ping"));
/// assert_eq!(frames[0].data, "{\"type\":\"ping\"}");
/// ```
#[derive(Debug, Default)]
pub struct SseFrameBuffer {
    /// Bytes of the current incomplete line
    pending: Vec<u8>,
    /// Event name of the frame being assembled
    event: Option<String>,
    /// Data lines of the frame being assembled
    data: Vec<String>,
}

impl SseFrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the buffer and return every frame they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.pending.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(newline_pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline_pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        frames
    }

    /// Flush whatever is buffered when the upstream body ends.
    ///
    /// Providers do not always terminate the last frame with a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if !self.pending.is_empty() {
            let line = String::from_utf8_lossy(&std::mem::take(&mut self.pending)).into_owned();
            let line = line.trim_end_matches('\r');
            if let Some(frame) = self.process_line(line) {
                return Some(frame);
            }
        }
        self.dispatch()
    }

    /// Whether any partial line or frame is still buffered
    pub fn has_incomplete(&self) -> bool {
        !self.pending.is_empty() || !self.data.is_empty() || self.event.is_some()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }
        // Comment lines (keep-alives)
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseFrame { event, data })
    }
}

/// Decode an upstream SSE body into provider events.
///
/// `extract` maps each frame to at most one event. The returned stream ends
/// right after the first terminal event; a transport error becomes
/// [`ProviderEvent::StreamError`] and a body that simply runs out becomes
/// [`ProviderEvent::StreamEnd`]. The upstream body is owned by the returned
/// stream, so dropping it releases the connection.
pub fn sse_events<S, E, F>(body: S, mut extract: F) -> EventStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
    F: FnMut(&SseFrame) -> Option<ProviderEvent> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut body = Box::pin(body);
        let mut buffer = SseFrameBuffer::new();

        loop {
            match body.next().await {
                Some(Ok(bytes)) => {
                    for frame in buffer.feed(&bytes) {
                        if let Some(event) = extract(&frame) {
                            let terminal = event.is_terminal();
                            yield event;
                            if terminal {
                                return;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    yield ProviderEvent::StreamError { cause: e.to_string() };
                    return;
                }
                None => {
                    if let Some(frame) = buffer.finish() {
                        if let Some(event) = extract(&frame) {
                            let terminal = event.is_terminal();
                            yield event;
                            if terminal {
                                return;
                            }
                        }
                    }
                    yield ProviderEvent::StreamEnd;
                    return;
                }
            }
        }
    })
}
