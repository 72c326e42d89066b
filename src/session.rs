//! Chat session: the transcript, the in-flight flag, and the two transitions
//! between Idle and Awaiting.
//!
//! State lives in a `watch` channel so the presentation layer can hold a
//! receiver and redraw on every change. Both transitions go through the
//! sender's modify methods, which makes the Awaiting check-and-set atomic even
//! when the session is cloned across tasks.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::ai::{build_messages, ApiMessage, CompletionTransport};
use crate::state::{ChatSnapshot, ChatTurn, Transcript};

/// Bot turn appended when the transport fails for any reason.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble connecting right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, or a request was already in flight. Nothing changed.
    Ignored,
    /// The endpoint answered and its text was appended.
    Replied,
    /// The transport failed and the fallback apology was appended.
    FellBack,
}

struct Inner {
    state: watch::Sender<ChatSnapshot>,
    transport: Arc<dyn CompletionTransport>,
    system_prompt: String,
}

#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<Inner>,
}

impl ChatSession {
    /// New session opened by the bot greeting.
    pub fn new(
        transport: Arc<dyn CompletionTransport>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self::with_transcript(transport, system_prompt, Transcript::with_greeting())
    }

    pub fn with_transcript(
        transport: Arc<dyn CompletionTransport>,
        system_prompt: impl Into<String>,
        transcript: Transcript,
    ) -> Self {
        let (state, _) = watch::channel(ChatSnapshot {
            transcript,
            awaiting: false,
        });
        Self {
            inner: Arc::new(Inner {
                state,
                transport,
                system_prompt: system_prompt.into(),
            }),
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn is_awaiting(&self) -> bool {
        self.inner.state.borrow().awaiting
    }

    /// Idle -> Awaiting.
    ///
    /// Appends the trimmed text as a user turn and raises the flag in one
    /// step, before any network activity. Returns `None` without touching
    /// the transcript when the text is blank or a request is in flight.
    pub fn begin(&self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let mut messages = None;
        let accepted = self.inner.state.send_if_modified(|snapshot| {
            if snapshot.awaiting {
                return false;
            }
            messages = Some(build_messages(
                &self.inner.system_prompt,
                snapshot.transcript.turns(),
                text,
            ));
            snapshot.transcript.push(ChatTurn::user(text));
            snapshot.awaiting = true;
            true
        });

        match messages {
            Some(messages) if accepted => {
                debug!(messages = messages.len(), "submission accepted");
                Some(PendingReply {
                    guard: AwaitingGuard {
                        session: self.clone(),
                        armed: true,
                    },
                    messages,
                })
            }
            _ => {
                debug!("submission ignored while a reply is pending");
                None
            }
        }
    }

    /// Submit and wait for the reply to be reconciled.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        match self.begin(text) {
            Some(pending) => pending.settle().await,
            None => SubmitOutcome::Ignored,
        }
    }
}

/// Holds the Awaiting flag for one submission. Dropping it on any path clears
/// the flag.
struct AwaitingGuard {
    session: ChatSession,
    armed: bool,
}

impl AwaitingGuard {
    /// Awaiting -> Idle, appending `turn` in the same notification.
    fn release_with(&mut self, turn: ChatTurn) {
        self.session.inner.state.send_modify(|snapshot| {
            snapshot.transcript.push(turn);
            snapshot.awaiting = false;
        });
        self.armed = false;
    }
}

impl Drop for AwaitingGuard {
    fn drop(&mut self) {
        if self.armed {
            warn!("pending reply dropped before it settled; clearing in-flight flag");
            self.session.inner.state.send_if_modified(|snapshot| {
                let was_awaiting = snapshot.awaiting;
                snapshot.awaiting = false;
                was_awaiting
            });
        }
    }
}

/// A submission that has been accepted but not yet answered.
pub struct PendingReply {
    guard: AwaitingGuard,
    messages: Vec<ApiMessage>,
}

impl PendingReply {
    /// The payload that will be sent to the transport.
    pub fn messages(&self) -> &[ApiMessage] {
        &self.messages
    }

    /// Run the transport call and reconcile the transcript with its outcome.
    pub async fn settle(mut self) -> SubmitOutcome {
        let transport = Arc::clone(&self.guard.session.inner.transport);

        let (turn, outcome) = match transport.complete(&self.messages).await {
            Ok(text) => {
                info!(chars = text.chars().count(), "reply received");
                (ChatTurn::bot(text), SubmitOutcome::Replied)
            }
            Err(e) => {
                warn!("completion failed, showing fallback: {e}");
                (ChatTurn::bot(FALLBACK_REPLY), SubmitOutcome::FellBack)
            }
        };

        self.guard.release_with(turn);
        outcome
    }
}
