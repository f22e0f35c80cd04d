//! Core chat relay shared by the standalone server and the serverless function
//!
//! `ChatProxy` owns everything a request needs (model, forwarding limit, upstream client),
//! so both hosts only translate their own request/response types around `respond` or `handle`.

use crate::chat::{ChatMessage, ChatRequest};
use crate::config::ProxyConfig;
use crate::error::ApiError;
use crate::prompt::SystemPrompt;
use crate::upstream::{CompletionClient, CompletionRequest, OpenRouterClient, UpstreamError};
use serde_json::Value;
use std::sync::Arc;

/// Framework-neutral HTTP reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyReply {
    pub status_code: u16,
    pub body: Value,
}

impl ProxyReply {
    fn ok(message: &ChatMessage) -> Self {
        Self {
            status_code: 200,
            body: serde_json::to_value(message).unwrap_or(Value::Null),
        }
    }

    fn error(err: &ApiError) -> Self {
        Self {
            status_code: err.status_code(),
            body: serde_json::to_value(err.to_response()).unwrap_or(Value::Null),
        }
    }
}

pub struct ChatProxy {
    model: String,
    max_forwarded_messages: Option<usize>,
    upstream: Arc<dyn CompletionClient>,
}

impl ChatProxy {
    #[must_use]
    pub fn new(
        config: &ProxyConfig,
        upstream: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            model: config.model.clone(),
            max_forwarded_messages: config.max_forwarded_messages,
            upstream,
        }
    }

    /// Builds a proxy talking to the configured OpenRouter endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built from the config.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        let client = OpenRouterClient::new(config)?;
        tracing::info!("Upstream endpoint: {} (model {})", client.endpoint(), config.model);
        Ok(Self::new(config, Arc::new(client)))
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// System instruction first, then the caller's messages in their original order.
    #[must_use]
    pub fn outbound_messages(
        &self,
        mut messages: Vec<ChatMessage>,
    ) -> Vec<ChatMessage> {
        if let Some(max) = self.max_forwarded_messages {
            let excess = messages.len().saturating_sub(max);
            if excess > 0 {
                tracing::debug!("Dropping {} oldest messages before forwarding", excess);
                messages.drain(..excess);
            }
        }

        let mut outbound = Vec::with_capacity(messages.len() + 1);
        outbound.push(SystemPrompt::message());
        outbound.extend(messages);
        outbound
    }

    #[must_use]
    pub fn completion_request(
        &self,
        request: ChatRequest,
    ) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages: self.outbound_messages(request.messages),
        }
    }

    /// Forwards a conversation upstream and returns the first reply.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Upstream` for any failure of the upstream call.
    pub async fn relay(
        &self,
        request: ChatRequest,
    ) -> Result<ChatMessage, ApiError> {
        let completion = self.completion_request(request);
        let reply = self.upstream.complete(&completion).await?;
        Ok(reply)
    }

    /// Parses a `POST /api/chat` body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the body is not a JSON object with a `messages` list.
    pub fn parse_request(body: &[u8]) -> Result<ChatRequest, ApiError> {
        serde_json::from_slice(body).map_err(|e| ApiError::invalid_request(format!("Failed to parse JSON: {e}")))
    }

    /// Answers a POST body: parse, relay, log the outcome.
    ///
    /// Both hosts funnel their POST bodies through here.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for an unusable body and `ApiError::Upstream`
    /// for any failure of the upstream call.
    pub async fn respond(
        &self,
        body: &[u8],
    ) -> Result<ChatMessage, ApiError> {
        let result = match Self::parse_request(body) {
            Ok(request) => {
                tracing::info!("Relaying {} messages to model {}", request.messages.len(), self.model);
                self.relay(request).await
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(message) => tracing::info!("Upstream replied as {} ({} chars)", message.role, message.content.len()),
            Err(e) => tracing::error!("Chat request failed: {}", e),
        }

        result
    }

    /// Handles one request to the chat endpoint.
    pub async fn handle(
        &self,
        method: &str,
        body: &[u8],
    ) -> ProxyReply {
        if method != "POST" {
            let err = ApiError::method_not_allowed(method);
            tracing::info!("{}", err);
            return ProxyReply::error(&err);
        }

        match self.respond(body).await {
            Ok(message) => ProxyReply::ok(&message),
            Err(e) => ProxyReply::error(&e),
        }
    }
}
