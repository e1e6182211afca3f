//! Chat-completions client for the policy pipeline.
//!
//! The policy pipeline needs one grounded completion per request. The
//! [`ChatModel`] trait is the seam: production uses [`OpenAiChatClient`]
//! against an OpenAI-compatible API, tests substitute a canned
//! implementation.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;

/// Errors raised by the chat-completions client.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no choices")]
    EmptyResponse,
}

/// A chat language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the assistant text.
    ///
    /// # Errors
    ///
    /// Returns `LlmError` on transport failure, a non-success status, or an
    /// empty completion. No retries - the failure surfaces to the caller.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

// =============================================================================
// Client
// =============================================================================

/// Chat client for an OpenAI-compatible `/chat/completions` API.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_base: String,
    api_key: SecretString,
    model: String,
}

impl OpenAiChatClient {
    /// Create a client from configuration.
    ///
    /// The request timeout comes from the config; a hung upstream fails the
    /// one request instead of stalling the serving loop.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Http` if the underlying client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}
