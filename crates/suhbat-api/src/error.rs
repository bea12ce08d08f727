//! Error types for suhbat-api

use thiserror::Error;

/// Result type alias using suhbat-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the chat service
#[derive(Error, Debug)]
pub enum Error {
    /// Connection-level failure (DNS, refused, reset, body read error)
    #[error("Network error: {0}")]
    Network(String),

    /// The request or the body read timed out
    #[error("Request timed out")]
    Timeout,

    /// Server answered with a non-success status
    #[error("Server error: status {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credential or config file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(" ({})", d),
        None => String::new(),
    }
}

/// Coarse failure kind reported for a failed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    Status(u16),
    Other,
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else if let Some(status) = e.status() {
            Error::server(status.as_u16(), None::<String>)
        } else if e.is_decode() {
            Error::UnexpectedResponse(e.to_string())
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl Error {
    /// Create a server error from a status code and optional detail
    pub fn server(status: u16, detail: Option<impl Into<String>>) -> Self {
        Self::Server {
            status,
            detail: detail.map(Into::into),
        }
    }

    /// The failure kind this error maps to
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Network(_) => FailureKind::Network,
            Error::Timeout => FailureKind::Timeout,
            Error::Server { status, .. } => FailureKind::Status(*status),
            _ => FailureKind::Other,
        }
    }

    /// Server-provided detail message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Whether the server rejected our credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Server { status: 401 | 403, .. } | Error::Auth(_))
    }
}
