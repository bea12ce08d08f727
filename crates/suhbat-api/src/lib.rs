//! suhbat-api: HTTP client for the suhbat chat service
//!
//! This crate talks to the chat backend: it streams replies as incremental
//! text deltas, fetches conversation history and listings, and manages the
//! stored bearer credential.

pub mod client;
pub mod credentials;
pub mod error;
pub mod sanitize;
pub mod stream;
pub mod types;

pub use client::{ChatClient, ClientConfig};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{Error, FailureKind, Result};
pub use sanitize::sanitize;
pub use stream::{ResponseEventStream, StreamEvent, StreamSession};
pub use types::*;
