//! Streaming event types and the delta tracker behind them

use async_stream::stream;
use futures::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::error::Error;

/// Events emitted while a streaming response is consumed.
///
/// A stream yields zero or more `Delta` events followed by exactly one
/// terminal event (`Done` or `Failed`). Nothing follows a terminal event.
#[derive(Debug)]
pub enum StreamEvent {
    /// Text that arrived since the previous delta
    Delta { delta: String },
    /// Body finished with a success status
    Done { text: String },
    /// Request failed; no deltas follow
    Failed { error: Error },
}

impl StreamEvent {
    /// Check if this is a terminal event (Done or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Failed { .. })
    }

    /// Delta text if this is a Delta event
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta { delta } => Some(delta),
            _ => None,
        }
    }
}

/// A stream of response events
pub type ResponseEventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// State of one streaming request.
///
/// The transport hands us raw body chunks. They are decoded into the
/// cumulative response text and the part not yet handed out is returned as
/// the next delta, so concatenating every delta reproduces the full text.
#[derive(Debug, Default)]
pub struct StreamSession {
    query: String,
    conversation_id: Option<String>,
    text: String,
    pending: Vec<u8>,
    delivered_len: usize,
}

impl StreamSession {
    pub fn new(query: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            query: query.into(),
            conversation_id,
            ..Default::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Bytes of text already handed out as deltas
    pub fn delivered_len(&self) -> usize {
        self.delivered_len
    }

    /// Full text decoded so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Diff a cumulative observation against what was already delivered.
    ///
    /// Returns `None` when nothing new arrived. `cumulative` must extend the
    /// text observed previously.
    pub fn observe(&mut self, cumulative: &str) -> Option<String> {
        if cumulative.len() <= self.delivered_len {
            return None;
        }
        let new_data = cumulative.get(self.delivered_len..)?;
        self.delivered_len = cumulative.len();
        Some(new_data.to_string())
    }

    /// Feed a raw body chunk and return the newly decodable text.
    ///
    /// A UTF-8 sequence cut by the chunk boundary is held back until the rest
    /// of it arrives. Invalid bytes decode to U+FFFD.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(chunk);
        self.decode_pending(false);
        self.observe_current()
    }

    /// Flush any incomplete trailing sequence and return the last delta
    pub fn finish(&mut self) -> Option<String> {
        self.decode_pending(true);
        self.observe_current()
    }

    /// Consume the session, returning the full text
    pub fn into_text(self) -> String {
        self.text
    }

    fn observe_current(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.text);
        let delta = self.observe(&text);
        self.text = text;
        delta
    }

    fn decode_pending(&mut self, at_end: bool) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    self.text.push_str(s);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.text
                        .push_str(std::str::from_utf8(&self.pending[..valid]).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None if at_end => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.clear();
                            return;
                        }
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Turn a response body into delta events.
///
/// Each chunk is run through the session; empty observations are skipped.
/// A chunk error ends the stream with `Failed` and no further deltas.
pub fn body_events<S, B, E>(
    mut session: StreamSession,
    body: S,
) -> impl Stream<Item = StreamEvent> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    stream! {
        let mut body = Box::pin(body);

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    if let Some(delta) = session.push_bytes(bytes.as_ref()) {
                        yield StreamEvent::Delta { delta };
                    }
                }
                Err(e) => {
                    let error: Error = e.into();
                    tracing::warn!(
                        "Stream for {:?} failed after {} bytes: {}",
                        session.conversation_id(),
                        session.delivered_len(),
                        error
                    );
                    yield StreamEvent::Failed { error };
                    return;
                }
            }
        }

        if let Some(delta) = session.finish() {
            yield StreamEvent::Delta { delta };
        }

        tracing::debug!("Stream complete: {} bytes", session.delivered_len());
        yield StreamEvent::Done { text: session.into_text() };
    }
}
