//! Slash commands for interactive mode

mod chats;
mod feedback;

pub use chats::ChatsCommand;
pub use feedback::FeedbackCommand;

use suhbat_api::Feedback;
use suhbat_chat::{AppState, MessageAssembler};

/// Result of executing a slash command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Start a fresh conversation
    NewConversation,
    /// Switch to an existing conversation and load its history
    OpenConversation(String),
    /// Fetch the conversation list and show its first page
    ListChats,
    /// Reload the current conversation from the server
    ReloadHistory,
    /// Rate the last reply
    SendFeedback(Feedback),
    /// Show a message to the user (not sent to the service)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(
    input: &str,
    assembler: &MessageAssembler,
    state: &mut AppState,
) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let (command, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let command = command.to_lowercase();
    let args = args.trim();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "new" | "n" => CommandResult::NewConversation,

        "chats" | "c" => CommandResult::ListChats,

        "more" => ChatsCommand::more(state),

        "open" | "o" => ChatsCommand::open(args, state.chats()),

        "history" => CommandResult::ReloadHistory,

        "like" | "good" => FeedbackCommand::execute("positive", args, &assembler.messages()),

        "dislike" | "bad" => FeedbackCommand::execute("negative", args, &assembler.messages()),

        "status" | "s" => CommandResult::Message(status_message(assembler, state)),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn status_message(assembler: &MessageAssembler, state: &AppState) -> String {
    let user = match state.user() {
        Some(user) if !user.name.is_empty() => format!("{} <{}>", user.name, user.email),
        Some(user) => user.email.clone(),
        None if state.is_logged_in() => "signed in".to_string(),
        None => "not signed in".to_string(),
    };
    format!(
        "User:         {}\nConversation: {}\nMessages:     {}",
        user,
        assembler.conversation_id().unwrap_or("(new)"),
        assembler.messages().len()
    )
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /new, /n               Start a new conversation
  /chats, /c             List your conversations
  /more                  Show the next page of conversations
  /open, /o <n|id>       Open a conversation by list number or id
  /history               Reload the current conversation
  /like [comment]        Rate the last reply as helpful
  /dislike [comment]     Rate the last reply as unhelpful
  /status, /s            Show sign-in and conversation info
  /quit, /exit, /q       Exit suhbat

Press Ctrl+C while a reply is streaming to stop it."#
        .to_string()
}
