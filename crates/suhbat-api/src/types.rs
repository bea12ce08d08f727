//! Wire and data types for the chat service

use serde::{Deserialize, Serialize};

/// Default device tag sent with every streaming request
pub const DEFAULT_DEVICE: &str = "mobile";

/// Body of a `POST /chat/stream` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    pub device: String,
}

impl StreamRequest {
    /// Create a request for a query, letting the server pick the conversation
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            chat_id: None,
            device: DEFAULT_DEVICE.to_string(),
        }
    }

    /// Attach a conversation id. An empty id is treated as unset.
    pub fn with_chat_id(mut self, chat_id: Option<impl Into<String>>) -> Self {
        self.chat_id = chat_id.map(Into::into).filter(|id| !id.is_empty());
        self
    }

    /// Override the device tag
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }
}

/// Body of a non-streaming `POST /chat` request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

/// One entry of the user's conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl ChatSummary {
    /// Display title, falling back to a short form of the id for unnamed chats
    pub fn title(&self) -> String {
        if self.name.is_empty() {
            let short: String = self.id.chars().take(6).collect();
            format!("Chat #{}", short)
        } else {
            self.name.clone()
        }
    }
}

/// Response of `GET /api/user-chats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChats {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub chats: Vec<ChatSummary>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One prior message as returned by `GET /api/chat-history/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HistoryMessage {
    /// Message body; a non-empty `content` wins over `text`
    pub fn body(&self) -> &str {
        self.content
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.text.as_deref())
            .unwrap_or_default()
    }

    pub fn is_user(&self) -> bool {
        self.role == "user"
    }

    /// Server timestamp as epoch milliseconds, if it parses as RFC 3339
    pub fn timestamp_millis(&self) -> Option<i64> {
        let raw = self.timestamp.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.timestamp_millis())
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.and_utc().timestamp_millis())
            })
    }
}

/// Response of `GET /api/chat-history/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatHistory {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

/// Response of `GET /idmobile`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatIdResponse {
    pub chat_id: String,
}

/// Cached user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl UserInfo {
    /// Basic profile derived from an email address, used when the server
    /// cannot tell us who we are
    pub fn from_email(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id: None,
            name,
            email: email.to_string(),
        }
    }
}

/// Response of `POST /auth/token`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body of `POST /register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Body of `POST /api/feedback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub message_text: String,
    pub answer_text: String,
    pub feedback_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Error body shape used by the service (`{"detail": "..."}`)
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Extract a readable detail string from a raw response body
    pub(crate) fn detail_from(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
