//! HTTP transport used by chat clients to reach the proxy endpoint.

use crate::chat::{ChatMessage, ChatRequest};
use crate::error::ErrorResponse;
use async_trait::async_trait;
use std::fmt;

pub const CHAT_PATH: &str = "/api/chat";

/// Why a client-side send failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The proxy could not be reached.
    Transport(String),
    /// The proxy answered with an error status.
    Server { status: u16, message: String },
    /// The reply was not a chat message.
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "Could not reach the chat server: {msg}"),
            ClientError::Server { status, message } => write!(f, "Chat server error ({status}): {message}"),
            ClientError::Decode(msg) => write!(f, "Unexpected reply from the chat server: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatMessage, ClientError>;
}

/// Posts chat requests to a running proxy.
pub struct HttpChatTransport {
    http: reqwest::Client,
    url: String,
}

impl HttpChatTransport {
    /// `base_url` is the proxy origin, e.g. `http://127.0.0.1:8080`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
    ) -> Self {
        Self {
            http,
            url: format!("{}{CHAT_PATH}", base_url.trim_end_matches('/')),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatMessage, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body).map_or(body, |err| err.error);
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        assert_eq!(HttpChatTransport::new("http://127.0.0.1:8080").url(), "http://127.0.0.1:8080/api/chat");
        assert_eq!(HttpChatTransport::new("https://chat.example.com/").url(), "https://chat.example.com/api/chat");
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Server {
            status: 500,
            message: "Error calling OpenRouter API".to_string(),
        };
        assert_eq!(err.to_string(), "Chat server error (500): Error calling OpenRouter API");
    }

    #[tokio::test]
    async fn test_unreachable_proxy() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpChatTransport::new(&format!("http://{addr}"));
        let result = transport.send(&ChatRequest::single(ChatMessage::user("Hello"))).await;

        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
