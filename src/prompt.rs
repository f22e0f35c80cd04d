use crate::chat::ChatMessage;

pub struct SystemPrompt;

impl SystemPrompt {
    // Embedded at compile time
    const TEXT: &'static str = include_str!("../templates/system_prompt.txt");

    /// The instruction text sent ahead of every conversation.
    #[must_use]
    pub fn text() -> &'static str {
        Self::TEXT.trim()
    }

    /// The instruction wrapped as the leading system message.
    #[must_use]
    pub fn message() -> ChatMessage {
        ChatMessage::system(Self::text())
    }
}
