//! Seams between the conversation runtime and the chat service

use async_trait::async_trait;
use suhbat_api::{ChatClient, ChatSummary, HistoryMessage, ResponseEventStream, Result};

/// Opens streaming replies
pub trait StreamTransport: Send + Sync {
    /// Start streaming a reply to `query`.
    ///
    /// The stream must end with exactly one terminal event.
    fn open(&self, query: &str, conversation_id: Option<&str>) -> ResponseEventStream;
}

/// Source of conversation ids, prior messages and the conversation list
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Ask for a fresh conversation id
    async fn new_conversation_id(&self) -> Result<String>;

    /// Prior messages of a conversation, oldest first
    async fn history(&self, conversation_id: &str) -> Result<Vec<HistoryMessage>>;

    /// The user's conversations
    async fn conversations(&self) -> Result<Vec<ChatSummary>>;
}

impl StreamTransport for ChatClient {
    fn open(&self, query: &str, conversation_id: Option<&str>) -> ResponseEventStream {
        self.stream_events(query, conversation_id)
    }
}

#[async_trait]
impl HistorySource for ChatClient {
    async fn new_conversation_id(&self) -> Result<String> {
        ChatClient::new_conversation_id(self).await
    }

    async fn history(&self, conversation_id: &str) -> Result<Vec<HistoryMessage>> {
        self.chat_history(conversation_id).await
    }

    async fn conversations(&self) -> Result<Vec<ChatSummary>> {
        self.user_chats().await
    }
}
