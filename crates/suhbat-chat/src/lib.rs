//! suhbat-chat: Conversation runtime over a streaming chat endpoint
//!
//! This crate assembles streamed replies into a transcript, one open
//! assistant message at a time, and tracks the session state around it.

pub mod assembler;
pub mod conversation;
pub mod error;
pub mod events;
pub mod handle;
pub mod state;
pub mod transport;

pub use assembler::{APOLOGY_TEXT, MessageAssembler, Submission};
pub use conversation::{ConversationMessage, MessageStatus, Transcript};
pub use error::{Error, Result, ValidationFailure};
pub use events::ChatEvent;
pub use handle::StreamHandle;
pub use state::{AppState, CHATS_PER_PAGE, ChatPager, MenuState};
pub use transport::{HistorySource, StreamTransport};
