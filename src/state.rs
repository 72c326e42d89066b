//! UI-agnostic conversation state
//!
//! The transcript and the snapshot handed to the presentation layer. Nothing
//! here depends on the terminal front end or on the transport.

/// Greeting the bot opens every session with.
pub const GREETING: &str =
    "Namaste! I'm WTIChat, India's First AI Assistant. How can I help you today?";

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub text: String,
    pub is_bot: bool,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_bot: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_bot: true,
        }
    }
}

/// Ordered, append-only history of the current session.
///
/// Turns can be appended and read but never edited or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript opened by the bot greeting.
    pub fn with_greeting() -> Self {
        Self {
            turns: vec![ChatTurn::bot(GREETING)],
        }
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Read-only view of a session: the transcript plus the in-flight flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub transcript: Transcript,
    pub awaiting: bool,
}
