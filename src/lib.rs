pub mod ai;
pub mod config;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{CompletionTransport, OpenRouterClient, TransportFailure};
pub use config::{Config, Settings};
pub use session::{ChatSession, PendingReply, SubmitOutcome, FALLBACK_REPLY};
pub use state::{ChatSnapshot, ChatTurn, Transcript, GREETING};
