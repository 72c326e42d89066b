use wtichat::{ChatSession, ChatSnapshot, PendingReply, Settings};

pub struct App {
    pub should_quit: bool,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat view state
    pub snapshot: ChatSnapshot,
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the chat area, set during render
    pub chat_lines: u16,  // Wrapped line count of the chat, set during render
    pub follow_bottom: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub title: String,
    pub model: String,

    session: ChatSession,
}

impl App {
    pub fn new(session: ChatSession, settings: &Settings) -> Self {
        let snapshot = session.snapshot();
        Self {
            should_quit: false,
            input: String::new(),
            cursor: 0,
            snapshot,
            chat_scroll: 0,
            chat_height: 0,
            chat_lines: 0,
            follow_bottom: true,
            animation_frame: 0,
            title: settings.title.clone(),
            model: settings.model.clone(),
            session,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.snapshot.awaiting
    }

    /// Take the input box contents and start a submission.
    ///
    /// Input is cleared only when the session accepts it; blank text and
    /// presses while a reply is pending leave everything as it was.
    pub fn submit_input(&mut self) -> Option<PendingReply> {
        let pending = self.session.begin(&self.input)?;
        self.input.clear();
        self.cursor = 0;
        self.apply_snapshot(self.session.snapshot());
        Some(pending)
    }

    pub fn apply_snapshot(&mut self, snapshot: ChatSnapshot) {
        self.snapshot = snapshot;
        if !self.snapshot.awaiting {
            self.animation_frame = 0;
        }
        self.scroll_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.snapshot.awaiting {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing. All of these are no-ops while a reply is pending.
    pub fn insert_char(&mut self, c: char) {
        if self.is_awaiting() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.is_awaiting() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if self.is_awaiting() {
            return;
        }
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Scrolling
    pub fn scroll_up(&mut self, amount: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(amount);
        self.follow_bottom = false;
    }

    pub fn scroll_down(&mut self, amount: u16) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(amount).min(max);
        self.follow_bottom = self.chat_scroll == max;
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    /// Pin the view to the newest turn (or "Thinking...") on the next render
    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
    }

    /// Record the rendered chat geometry and settle the scroll offset.
    /// `lines` must be counted with the same wrapping the chat pane uses.
    pub fn update_chat_layout(&mut self, lines: u16, height: u16) {
        self.chat_lines = lines;
        self.chat_height = height;

        let max = self.max_scroll();
        self.chat_scroll = if self.follow_bottom {
            max
        } else {
            self.chat_scroll.min(max)
        };
    }

    fn max_scroll(&self) -> u16 {
        self.chat_lines.saturating_sub(self.chat_height)
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use wtichat::ai::{ApiMessage, CompletionTransport, TransportFailure};
    use wtichat::{ChatTurn, Config};

    struct EchoTransport;

    #[async_trait]
    impl CompletionTransport for EchoTransport {
        async fn complete(&self, messages: &[ApiMessage]) -> Result<String, TransportFailure> {
            Ok(format!("echo: {}", messages.last().map(|m| m.content.as_str()).unwrap_or("")))
        }
    }

    fn test_app() -> App {
        let settings = Config {
            api_key: Some("test-key".to_string()),
            ..Config::default()
        }
        .resolve_with_env_key(None)
        .unwrap();
        let session = ChatSession::new(Arc::new(EchoTransport), settings.system_prompt.clone());
        App::new(session, &settings)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[tokio::test]
    async fn test_submit_clears_input_and_disables_editing() {
        let mut app = test_app();
        type_text(&mut app, "Hi");

        let pending = app.submit_input().unwrap();

        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert!(app.is_awaiting());
        assert_eq!(app.snapshot.transcript.last(), Some(&ChatTurn::user("Hi")));

        type_text(&mut app, "ignored");
        assert!(app.input.is_empty());

        pending.settle().await;
    }

    #[tokio::test]
    async fn test_blank_input_is_kept_and_not_submitted() {
        let mut app = test_app();
        type_text(&mut app, "   ");

        assert!(app.submit_input().is_none());
        assert_eq!(app.input, "   ");
        assert_eq!(app.snapshot.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_settled_reply_reaches_view_through_snapshot() {
        let mut app = test_app();
        let mut rx = app.session.subscribe();
        type_text(&mut app, "Hi");

        app.submit_input().unwrap().settle().await;
        let snapshot = rx.borrow_and_update().clone();
        app.apply_snapshot(snapshot);

        assert!(!app.is_awaiting());
        assert_eq!(app.snapshot.transcript.last(), Some(&ChatTurn::bot("echo: Hi")));
    }

    #[test]
    fn test_cursor_editing_is_utf8_safe() {
        let mut app = test_app();
        type_text(&mut app, "नमस्ते");
        app.cursor_home();
        app.cursor_right();
        app.delete();
        app.cursor_end();
        app.backspace();

        assert_eq!(app.input.chars().count(), 4);
        assert_eq!(app.cursor, 4);
    }

    #[test]
    fn test_new_snapshot_pins_view_to_bottom() {
        let mut app = test_app();
        app.update_chat_layout(40, 5);
        assert_eq!(app.chat_scroll, 35);

        app.scroll_up(10);
        assert!(!app.follow_bottom);
        app.update_chat_layout(42, 5);
        assert_eq!(app.chat_scroll, 25);

        let mut snapshot = app.snapshot.clone();
        snapshot.transcript.push(ChatTurn::user("one more"));
        app.apply_snapshot(snapshot);
        app.update_chat_layout(45, 5);
        assert_eq!(app.chat_scroll, 40);
    }

    #[test]
    fn test_scroll_down_clamps_and_resumes_following() {
        let mut app = test_app();
        app.update_chat_layout(40, 5);
        app.scroll_up(3);

        app.scroll_down(100);
        assert_eq!(app.chat_scroll, 35);
        assert!(app.follow_bottom);
    }

    #[test]
    fn test_scroll_down_saturates_at_line_limit() {
        let mut app = test_app();
        app.update_chat_layout(u16::MAX, 0);
        app.chat_scroll = u16::MAX - 1;

        app.scroll_down(10);
        assert_eq!(app.chat_scroll, u16::MAX);
    }
}
