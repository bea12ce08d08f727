//! /like and /dislike - rate the most recent reply

use super::CommandResult;
use suhbat_api::Feedback;
use suhbat_chat::ConversationMessage;

pub struct FeedbackCommand;

impl FeedbackCommand {
    /// Build feedback for the last completed reply and the question before it
    pub fn execute(kind: &str, args: &str, messages: &[ConversationMessage]) -> CommandResult {
        let Some(pos) = messages.iter().rposition(|m| !m.is_user && !m.is_open()) else {
            return CommandResult::Message("No reply to rate yet.".to_string());
        };
        let question = messages[..pos]
            .iter()
            .rev()
            .find(|m| m.is_user)
            .map(|m| m.text.clone())
            .unwrap_or_default();

        CommandResult::SendFeedback(Feedback {
            message_text: question,
            answer_text: messages[pos].text.clone(),
            feedback_type: kind.to_string(),
            comment: (!args.is_empty()).then(|| args.to_string()),
        })
    }
}
