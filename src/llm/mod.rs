//! Local LLM chat client.
//!
//! A [`ChatModel`] sends an ordered list of role-tagged messages and returns the
//! reply text. [`WildlifeAssistant`] layers the two prompts the assistant needs
//! (state extraction and context-grounded answers) on top of any chat model.

mod assistant;
mod ollama;

pub use assistant::WildlifeAssistant;
pub use ollama::OllamaChat;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Trait for chat-completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the messages and return the reply content.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

/// Remove markdown emphasis markers (`**` and `*`) from model output.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace('*', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_emphasis() {
        assert_eq!(strip_emphasis("**bold** and *italic*"), "bold and italic");
    }

    #[test]
    fn test_strip_emphasis_leaves_plain_text() {
        assert_eq!(strip_emphasis("Step 1: call 1926"), "Step 1: call 1926");
        assert_eq!(strip_emphasis("***"), "");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::system("hi")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hi");
    }
}
