//! Message assembly: user input in, streamed assistant replies out.

use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use suhbat_api::{ResponseEventStream, StreamEvent, sanitize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    conversation::{ConversationMessage, Transcript, generate_id},
    error::{Error, Result, ValidationFailure},
    events::ChatEvent,
    handle::StreamHandle,
    transport::{HistorySource, StreamTransport},
};

/// Text shown in place of a reply whose stream failed
pub const APOLOGY_TEXT: &str = "An error occurred. Please try again.";

/// A submitted message whose reply is streaming
pub struct Submission {
    pub user_id: String,
    pub assistant_id: String,
    task: JoinHandle<Result<String>>,
}

impl Submission {
    /// Wait for the reply. Resolves to the assembled assistant text.
    pub async fn wait(self) -> Result<String> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(Error::Other(format!("Stream task failed: {}", e))),
        }
    }
}

/// Owns the transcript of one conversation and feeds streamed replies into it
pub struct MessageAssembler {
    transcript: Arc<Mutex<Transcript>>,
    transport: Arc<dyn StreamTransport>,
    conversation_id: Option<String>,
    handle: StreamHandle,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl MessageAssembler {
    /// Create an assembler with an empty transcript and no conversation id
    pub fn new(transport: Arc<dyn StreamTransport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            transcript: Arc::new(Mutex::new(Transcript::new())),
            transport,
            conversation_id: None,
            handle: StreamHandle::new(),
            event_tx,
        }
    }

    /// Start in an existing conversation
    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into()).filter(|id| !id.is_empty());
        self
    }

    /// Subscribe to conversation events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    /// Snapshot of the transcript
    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.transcript.lock().messages().to_vec()
    }

    /// Snapshot of one message
    pub fn message(&self, id: &str) -> Option<ConversationMessage> {
        self.transcript.lock().get(id).cloned()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Get a handle for aborting or awaiting the active stream from elsewhere
    pub fn handle(&self) -> StreamHandle {
        self.handle.clone()
    }

    /// Whether a reply is streaming
    pub fn is_streaming(&self) -> bool {
        self.handle.is_streaming()
    }

    /// Abort the streaming reply; the placeholder keeps the text received so far
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait until no reply is streaming
    pub async fn wait_for_idle(&self) {
        self.handle.wait_for_idle().await;
    }

    /// Submit a user message and start streaming the reply.
    ///
    /// Rejected without touching the transcript when the trimmed text is
    /// empty or another reply is still streaming. Must be called from within
    /// a Tokio runtime; the reply streams on a spawned task.
    pub fn submit(&self, text: &str) -> Result<Submission> {
        let query = text.trim();
        if query.is_empty() {
            return Err(ValidationFailure::EmptyQuery.into());
        }

        let Some(cancel) = self.handle.try_begin() else {
            tracing::debug!("Submit rejected: reply still streaming");
            return Err(ValidationFailure::StreamInFlight.into());
        };

        let (user_id, assistant_id) = {
            let mut transcript = self.transcript.lock();
            let open = transcript.open_message().is_some();
            let ids = if open {
                None
            } else {
                let user_id = transcript.push_user(query);
                transcript
                    .push_placeholder()
                    .map(|assistant_id| (user_id, assistant_id))
            };
            drop(transcript);
            match ids {
                Some(ids) => ids,
                None => {
                    self.handle.finish();
                    return Err(ValidationFailure::StreamInFlight.into());
                }
            }
        };

        let _ = self.event_tx.send(ChatEvent::Submitted {
            user_id: user_id.clone(),
            assistant_id: assistant_id.clone(),
        });

        tracing::debug!(
            "Streaming reply {} (conversation: {:?})",
            assistant_id,
            self.conversation_id
        );
        let stream = self.transport.open(query, self.conversation_id.as_deref());

        let task = tokio::spawn(drive_stream(
            Arc::clone(&self.transcript),
            assistant_id.clone(),
            stream,
            cancel,
            self.handle.clone(),
            self.event_tx.clone(),
        ));

        Ok(Submission {
            user_id,
            assistant_id,
            task,
        })
    }

    /// Return the conversation id, asking the history source for a new one
    /// when none is set yet. Falls back to a locally generated id if the
    /// source is unreachable.
    pub async fn get_or_create_conversation_id(&mut self, history: &dyn HistorySource) -> String {
        if let Some(id) = &self.conversation_id {
            return id.clone();
        }

        let id = match history.new_conversation_id().await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to get a conversation id, using a local one: {}", e);
                generate_id()
            }
        };
        self.conversation_id = Some(id.clone());
        id
    }

    /// Replace the transcript with the stored messages of this conversation.
    ///
    /// Returns the number of messages loaded; zero when no conversation id
    /// is set.
    pub async fn load_history(&mut self, history: &dyn HistorySource) -> Result<usize> {
        if self.is_streaming() {
            return Err(ValidationFailure::StreamInFlight.into());
        }
        let Some(id) = self.conversation_id.clone() else {
            return Ok(0);
        };

        let messages = history.history(&id).await?;
        let count = messages.len();
        self.transcript.lock().replace_with_history(messages);
        tracing::debug!("Loaded {} messages for conversation {}", count, id);
        Ok(count)
    }

    /// Switch to another existing conversation, clearing the transcript
    pub fn open_conversation(&mut self, conversation_id: impl Into<String>) -> Result<()> {
        if self.is_streaming() {
            return Err(ValidationFailure::StreamInFlight.into());
        }
        self.conversation_id = Some(conversation_id.into()).filter(|id| !id.is_empty());
        self.transcript.lock().clear();
        Ok(())
    }

    /// Start a fresh conversation; the next id comes from the server
    pub fn new_conversation(&mut self) -> Result<()> {
        if self.is_streaming() {
            return Err(ValidationFailure::StreamInFlight.into());
        }
        self.conversation_id = None;
        self.transcript.lock().clear();
        Ok(())
    }
}

enum Outcome {
    Done,
    Failed(suhbat_api::Error),
    Cancelled,
}

/// Feed one reply stream into the placeholder `message_id`.
///
/// The placeholder is closed and the stream slot released before the
/// terminal event goes out, so listeners may submit again right away.
async fn drive_stream(
    transcript: Arc<Mutex<Transcript>>,
    message_id: String,
    mut stream: ResponseEventStream,
    cancel: CancellationToken,
    handle: StreamHandle,
    events: broadcast::Sender<ChatEvent>,
) -> Result<String> {
    let outcome = loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break Outcome::Cancelled,
            event = stream.next() => event,
        };

        match event {
            Some(StreamEvent::Delta { delta }) => {
                let clean = sanitize(&delta);
                if clean.is_empty() {
                    continue;
                }
                transcript.lock().append(&message_id, &clean);
                let _ = events.send(ChatEvent::Delta {
                    message_id: message_id.clone(),
                    delta: clean,
                });
            }
            Some(StreamEvent::Done { .. }) => break Outcome::Done,
            Some(StreamEvent::Failed { error }) => break Outcome::Failed(error),
            None => {
                break Outcome::Failed(suhbat_api::Error::UnexpectedResponse(
                    "stream ended without completing".to_string(),
                ));
            }
        }
    };

    match outcome {
        Outcome::Done => {
            let text = transcript.lock().close(&message_id).unwrap_or_default();
            handle.finish();
            tracing::debug!("Reply {} complete ({} bytes)", message_id, text.len());
            let _ = events.send(ChatEvent::Completed {
                message_id,
                text: text.clone(),
            });
            Ok(text)
        }
        Outcome::Failed(error) => {
            transcript.lock().fail(&message_id, APOLOGY_TEXT);
            handle.finish();
            tracing::warn!("Reply {} failed: {}", message_id, error);
            let _ = events.send(ChatEvent::Failed {
                message_id,
                error: error.to_string(),
            });
            Err(error.into())
        }
        Outcome::Cancelled => {
            transcript.lock().close(&message_id);
            handle.finish();
            tracing::debug!("Reply {} cancelled", message_id);
            let _ = events.send(ChatEvent::Cancelled { message_id });
            Err(Error::Cancelled)
        }
    }
}
