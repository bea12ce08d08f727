//! Conversation transcript: ordered messages with at most one open entry.

use serde::{Deserialize, Serialize};
use suhbat_api::HistoryMessage;

/// Generate a message id: millisecond timestamp plus a random suffix
pub fn generate_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "id-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

/// Whether a message may still change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Open,
    Closed,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub status: MessageStatus,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
}

impl ConversationMessage {
    fn new(text: String, is_user: bool, status: MessageStatus) -> Self {
        Self {
            id: generate_id(),
            text,
            is_user,
            status,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == MessageStatus::Open
    }
}

impl From<HistoryMessage> for ConversationMessage {
    fn from(msg: HistoryMessage) -> Self {
        let timestamp = msg
            .timestamp_millis()
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        Self {
            id: msg.id.clone().unwrap_or_else(generate_id),
            text: msg.body().to_string(),
            is_user: msg.is_user(),
            status: MessageStatus::Closed,
            timestamp,
        }
    }
}

/// Ordered messages of one conversation.
///
/// Closed entries never change. At most one entry (the assistant
/// placeholder of the active stream) is open.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ConversationMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ConversationMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// The entry currently open for mutation, if any
    pub fn open_message(&self) -> Option<&ConversationMessage> {
        self.messages.iter().find(|m| m.is_open())
    }

    /// Append a closed user message, returning its id
    pub fn push_user(&mut self, text: impl Into<String>) -> String {
        let msg = ConversationMessage::new(text.into(), true, MessageStatus::Closed);
        let id = msg.id.clone();
        self.messages.push(msg);
        id
    }

    /// Append an empty open assistant message.
    ///
    /// Returns `None` if another entry is still open.
    pub fn push_placeholder(&mut self) -> Option<String> {
        if self.open_message().is_some() {
            return None;
        }
        let msg = ConversationMessage::new(String::new(), false, MessageStatus::Open);
        let id = msg.id.clone();
        self.messages.push(msg);
        Some(id)
    }

    /// Append text to the open entry `id`. Closed or unknown entries are left alone.
    pub fn append(&mut self, id: &str, chunk: &str) -> bool {
        match self.open_mut(id) {
            Some(msg) => {
                msg.text.push_str(chunk);
                true
            }
            None => false,
        }
    }

    /// Close the open entry `id`, returning its final text
    pub fn close(&mut self, id: &str) -> Option<String> {
        let msg = self.open_mut(id)?;
        msg.status = MessageStatus::Closed;
        Some(msg.text.clone())
    }

    /// Replace the text of the open entry `id` and close it in one step
    pub fn fail(&mut self, id: &str, text: &str) -> bool {
        match self.open_mut(id) {
            Some(msg) => {
                msg.text = text.to_string();
                msg.status = MessageStatus::Closed;
                true
            }
            None => false,
        }
    }

    /// Replace everything with closed messages loaded from the server
    pub fn replace_with_history(&mut self, history: Vec<HistoryMessage>) {
        self.messages = history.into_iter().map(ConversationMessage::from).collect();
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn open_mut(&mut self, id: &str) -> Option<&mut ConversationMessage> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .filter(|m| m.is_open())
    }
}
