use serde::Serialize;

use crate::state::ChatTurn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMessage {
    pub role: Role,
    pub content: String,
}

impl ApiMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ApiMessage],
}

/// Build the message list for one submission.
///
/// `history` is the transcript as it stood before `user_text` was submitted.
/// The result is the system prompt, then every prior turn in order, then the
/// new user text. The full history is resent each time.
pub fn build_messages(
    system_prompt: &str,
    history: &[ChatTurn],
    user_text: &str,
) -> Vec<ApiMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ApiMessage::new(Role::System, system_prompt));

    for turn in history {
        let role = if turn.is_bot { Role::Assistant } else { Role::User };
        messages.push(ApiMessage::new(role, turn.text.as_str()));
    }

    messages.push(ApiMessage::new(Role::User, user_text));
    messages
}
