use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::request::{ApiMessage, CompletionRequest};
use super::{CompletionTransport, TransportFailure};
use crate::config::Settings;

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

/// HTTP client for the OpenRouter chat completions API.
///
/// Every call carries the bearer key plus the `HTTP-Referer` and `X-Title`
/// attribution headers OpenRouter uses to identify the calling app. No
/// timeout is set on the client.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    referer: String,
    title: String,
}

impl OpenRouterClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            referer: settings.referer.clone(),
            title: settings.title.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionTransport for OpenRouterClient {
    async fn complete(&self, messages: &[ApiMessage]) -> Result<String, TransportFailure> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        debug!(model = %self.model, messages = messages.len(), "sending completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportFailure::request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("completion endpoint returned {status}: {body}");
            return Err(TransportFailure::Status(status.as_u16()));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| TransportFailure::decode(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(TransportFailure::EmptyChoices)
    }
}
