pub mod openrouter;
pub mod request;

use async_trait::async_trait;
use thiserror::Error;

pub use openrouter::OpenRouterClient;
pub use request::{build_messages, ApiMessage, CompletionRequest, Role};

/// Anything that prevented a completion string from being obtained.
///
/// The variants exist for logging only; the chat session treats them all
/// the same way.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("request failed: {0}")]
    Request(String),

    #[error("endpoint returned {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("response contained no choices")]
    EmptyChoices,
}

impl TransportFailure {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Sends a role-tagged message list to a completion endpoint and returns the
/// assistant text of the first choice.
///
/// Implementors own transport and vendor details. One call is one request;
/// there is no retry.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, messages: &[ApiMessage]) -> Result<String, TransportFailure>;
}
