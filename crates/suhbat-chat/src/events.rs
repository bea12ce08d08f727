//! Conversation event types

use serde::{Deserialize, Serialize};

/// Events broadcast while a conversation runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A user message and its assistant placeholder were appended
    Submitted { user_id: String, assistant_id: String },

    /// Sanitized text appended to the placeholder
    Delta { message_id: String, delta: String },

    /// The placeholder was closed with its final text
    Completed { message_id: String, text: String },

    /// The stream failed; the placeholder now holds the apology text
    Failed { message_id: String, error: String },

    /// The stream was aborted; the placeholder keeps what it had
    Cancelled { message_id: String },
}

impl ChatEvent {
    /// Check if this event ends a submission
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChatEvent::Completed { .. } | ChatEvent::Failed { .. } | ChatEvent::Cancelled { .. }
        )
    }

    /// Id of the assistant message this event refers to
    pub fn message_id(&self) -> &str {
        match self {
            ChatEvent::Submitted { assistant_id, .. } => assistant_id,
            ChatEvent::Delta { message_id, .. }
            | ChatEvent::Completed { message_id, .. }
            | ChatEvent::Failed { message_id, .. }
            | ChatEvent::Cancelled { message_id } => message_id,
        }
    }
}
