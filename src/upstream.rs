//! Upstream chat-completion client
//!
//! Speaks the OpenAI-compatible `/chat/completions` contract that OpenRouter exposes.
//! Only `choices[0].message` of the response is used, and its shape is checked before
//! it is handed back to the caller.

use crate::chat::ChatMessage;
use crate::config::ProxyConfig;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Payload sent to the upstream API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
pub struct CompletionChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The HTTP client could not be built (bad key characters, TLS setup).
    Client(String),
    /// The request never produced a response.
    Transport(String),
    /// The upstream answered with a non-success status.
    Status { status: u16, body: String },
    /// The body was not JSON, or the message had the wrong shape.
    Decode(String),
    /// The body decoded but carried no `choices[0].message`.
    MissingChoice,
}

impl fmt::Display for UpstreamError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            UpstreamError::Client(msg) => write!(f, "Failed to build upstream client: {msg}"),
            UpstreamError::Transport(msg) => write!(f, "Upstream request failed: {msg}"),
            UpstreamError::Status { status, body } => write!(f, "Upstream returned status {status}: {body}"),
            UpstreamError::Decode(msg) => write!(f, "Failed to decode upstream response: {msg}"),
            UpstreamError::MissingChoice => write!(f, "Upstream response has no choices[0].message"),
        }
    }
}

impl std::error::Error for UpstreamError {}

/// Extracts and validates `choices[0].message` from a raw upstream body.
///
/// # Errors
///
/// Returns `Decode` if the body is not JSON or the message is not `{ role, content }`,
/// and `MissingChoice` if there is no first choice carrying a message.
pub fn first_choice_message(body: &str) -> Result<ChatMessage, UpstreamError> {
    let value: Value = serde_json::from_str(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

    let message = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or(UpstreamError::MissingChoice)?;

    ChatMessage::deserialize(message).map_err(|e| UpstreamError::Decode(format!("choices[0].message: {e}")))
}

/// Anything able to turn a completion request into the assistant's reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<ChatMessage, UpstreamError>;
}

/// Client for OpenRouter (or any OpenAI-compatible endpoint).
pub struct OpenRouterClient {
    http: reqwest::Client,
    endpoint: String,
}

impl OpenRouterClient {
    /// Builds a client that authenticates every request with the configured key.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Client` if the key is not a valid header value or the
    /// underlying HTTP client cannot be created.
    pub fn new(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| UpstreamError::Client(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.completions_url(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<ChatMessage, UpstreamError> {
        tracing::debug!(
            "Calling {} with model {} and {} messages",
            self.endpoint,
            request.model,
            request.messages.len()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        first_choice_message(&body)
    }
}
