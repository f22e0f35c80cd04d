//! # chat-proxy
//!
//! A small web chat backend that relays conversations to an OpenRouter chat-completion
//! model.
//!
//! The browser sends its messages to `POST /api/chat`; the proxy puts a fixed system
//! instruction in front of them, calls the upstream API with a server-held key, and
//! returns the first choice's message. The key never leaves the server.
//!
//! ## Features
//!
//! - **Stateless relay**: every request is independent, nothing is stored
//! - **Injected configuration**: the key, upstream URL and model are resolved once at startup
//! - **Two hosts, one core**: a standalone actix-web server and a Vercel serverless function
//! - **Client session model**: the chat page's submit/pending/error behaviour, usable from Rust
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! chat-proxy = { version = "0.1", default-features = false }
//! ```
//!
//! ### Relaying a conversation
//!
//! ```rust,no_run
//! use chat_proxy::{ChatMessage, ChatProxy, ChatRequest, ProxyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ProxyConfig::new("your-openrouter-key");
//!     let proxy = ChatProxy::from_config(&config)?;
//!
//!     let reply = proxy
//!         .relay(ChatRequest::single(ChatMessage::user("Hello")))
//!         .await?;
//!
//!     println!("{}: {}", reply.role, reply.content);
//!     Ok(())
//! }
//! ```
//!
//! ### Talking to a running proxy
//!
//! ```rust,no_run
//! use chat_proxy::{ChatSession, HttpChatTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = HttpChatTransport::new("http://127.0.0.1:8080");
//!     let mut session = ChatSession::new();
//!
//!     session.set_input("What can you help me with?");
//!     session.submit(&transport).await;
//!
//!     for message in session.messages() {
//!         println!("{}: {}", message.role, message.content);
//!     }
//! }
//! ```
//!
//! ## Server Mode
//!
//! With the `server` feature (enabled by default) run the standalone binary:
//!
//! ```bash
//! OPENROUTER_API_KEY=... cargo run
//! ```

// Core modules - always available
pub mod chat;
pub mod config;
pub mod error;
pub mod prompt;
pub mod proxy;
pub mod session;
pub mod transport;
pub mod upstream;

// Re-export commonly used types for easier access
pub use chat::{ChatMessage, ChatRequest, ChatRole};
pub use config::{ConfigError, ProxyConfig, ServerConfig};
pub use error::{ApiError, ErrorResponse};
pub use proxy::{ChatProxy, ProxyReply};
pub use session::{ChatSession, ContextMode, SessionState};
pub use transport::{ChatTransport, ClientError, HttpChatTransport};
pub use upstream::{CompletionClient, CompletionRequest, OpenRouterClient, UpstreamError};

// Server-specific modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod vercel;
