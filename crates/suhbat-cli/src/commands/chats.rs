//! /chats, /more and /open - browse the conversation list

use super::CommandResult;
use suhbat_api::ChatSummary;
use suhbat_chat::{AppState, ChatPager};

pub struct ChatsCommand;

impl ChatsCommand {
    /// Render the first page after the list was (re)loaded
    pub fn first_page(pager: &ChatPager) -> String {
        if pager.total() == 0 {
            return "No conversations yet.".to_string();
        }
        let mut output = String::from("Conversations\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        render_rows(&mut output, 0, pager.visible());
        push_footer(&mut output, pager);
        output
    }

    /// /more - reveal the next page
    pub fn more(state: &mut AppState) -> CommandResult {
        let pager = state.chats();
        if !pager.has_more() {
            return CommandResult::Message(if pager.total() == 0 {
                "No conversations loaded. Use /chats first.".to_string()
            } else {
                "No more conversations.".to_string()
            });
        }
        let start = pager.visible().len();
        let mut output = String::new();
        render_rows(&mut output, start, state.load_more_chats());
        push_footer(&mut output, state.chats());
        CommandResult::Message(output)
    }

    /// /open - accepts a number from the shown list or a raw conversation id
    pub fn open(args: &str, pager: &ChatPager) -> CommandResult {
        if args.is_empty() {
            return CommandResult::Message("Usage: /open <number|id>".to_string());
        }

        match args.parse::<usize>() {
            Ok(n) => match n.checked_sub(1).and_then(|i| pager.visible().get(i)) {
                Some(chat) => CommandResult::OpenConversation(chat.id.clone()),
                None if pager.total() == 0 => CommandResult::OpenConversation(args.to_string()),
                None => CommandResult::Message(format!(
                    "No conversation #{}. {} shown.",
                    n,
                    pager.visible().len()
                )),
            },
            Err(_) => CommandResult::OpenConversation(args.to_string()),
        }
    }
}

fn render_rows(output: &mut String, start: usize, chats: &[ChatSummary]) {
    for (i, chat) in chats.iter().enumerate() {
        let date = chat.updated_at.split('T').next().unwrap_or_default();
        output.push_str(&format!("{:>3}. {:<30} {}\n", start + i + 1, chat.title(), date));
    }
}

fn push_footer(output: &mut String, pager: &ChatPager) {
    if pager.has_more() {
        output.push_str(&format!(
            "\nShowing {} of {}. /more for the next page, /open <n> to switch.",
            pager.visible().len(),
            pager.total()
        ));
    } else {
        output.push_str("\n/open <n> to switch.");
    }
}
