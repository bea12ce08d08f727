//! Error types for suhbat-chat

use thiserror::Error;

/// Result type alias using suhbat-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Why a request was rejected before reaching the network
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("message is empty")]
    EmptyQuery,
    #[error("a reply is still streaming")]
    StreamInFlight,
}

/// Errors that can occur while running a conversation
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the service client
    #[error(transparent)]
    Api(#[from] suhbat_api::Error),

    /// Rejected locally
    #[error("Rejected: {0}")]
    Validation(ValidationFailure),

    /// The stream was aborted by the caller
    #[error("Cancelled")]
    Cancelled,

    /// A generic conversation error
    #[error("{0}")]
    Other(String),
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Error::Validation(failure)
    }
}

impl Error {
    /// The rejection reason, if this was a local validation failure
    pub fn validation(&self) -> Option<ValidationFailure> {
        match self {
            Error::Validation(v) => Some(*v),
            _ => None,
        }
    }
}
