//! Client-side chat session
//!
//! Models what the chat page does: an input buffer, the displayed conversation, and a
//! request status. Sending is split into `begin_submit` and `finish` so a host can keep
//! rendering while the request is in flight; `submit` runs both around a transport call.
//!
//! While a request is pending the input is disabled and `begin_submit` refuses to start
//! another one.

use crate::chat::{ChatMessage, ChatRequest};
use crate::transport::{ChatTransport, ClientError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Pending,
    Success(ChatMessage),
    Failed(ClientError),
}

/// How much of the conversation is sent with each new message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMode {
    /// Only the message just typed.
    #[default]
    LatestOnly,
    /// Every displayed message, oldest first.
    FullHistory,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    input: String,
    messages: Vec<ChatMessage>,
    state: SessionState,
    context: ContextMode,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_context(ContextMode::LatestOnly)
    }

    #[must_use]
    pub const fn with_context(context: ContextMode) -> Self {
        Self {
            input: String::new(),
            messages: Vec::new(),
            state: SessionState::Idle,
            context,
        }
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(
        &mut self,
        input: impl Into<String>,
    ) {
        self.input = input.into();
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, SessionState::Pending)
    }

    /// Whether the input box and send button accept interaction.
    #[must_use]
    pub const fn input_enabled(&self) -> bool {
        !self.is_pending()
    }

    /// The error to show the user, if the last send failed.
    #[must_use]
    pub const fn last_error(&self) -> Option<&ClientError> {
        match &self.state {
            SessionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Starts sending the current input.
    ///
    /// Returns the request to send, or `None` when nothing should be sent: the input is
    /// blank, or a request is already pending. The typed text is kept as-is (not trimmed).
    pub fn begin_submit(&mut self) -> Option<ChatRequest> {
        if self.is_pending() || self.input.trim().is_empty() {
            return None;
        }

        let user_message = ChatMessage::user(self.input.clone());
        self.messages.push(user_message.clone());
        self.state = SessionState::Pending;

        let request = match self.context {
            ContextMode::LatestOnly => ChatRequest::single(user_message),
            ContextMode::FullHistory => ChatRequest {
                messages: self.messages.clone(),
            },
        };

        Some(request)
    }

    /// Records the outcome of a pending request and re-enables input.
    pub fn finish(
        &mut self,
        result: Result<ChatMessage, ClientError>,
    ) {
        if !self.is_pending() {
            tracing::warn!("Ignoring a reply that arrived with no request pending");
            return;
        }

        self.state = match result {
            Ok(reply) => {
                self.messages.push(reply.clone());
                SessionState::Success(reply)
            }
            Err(err) => {
                tracing::error!("Chat request failed: {}", err);
                SessionState::Failed(err)
            }
        };
        self.input.clear();
    }

    /// Sends the current input through `transport` and records the outcome.
    ///
    /// Returns `false` when nothing was sent.
    pub async fn submit<T>(
        &mut self,
        transport: &T,
    ) -> bool
    where
        T: ChatTransport + ?Sized,
    {
        let Some(request) = self.begin_submit() else {
            return false;
        };

        let result = transport.send(&request).await;
        self.finish(result);
        true
    }
}
