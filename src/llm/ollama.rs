//! Ollama chat backend.

use super::{ChatMessage, ChatModel};
use crate::error::{GenanimlError, Result};
use crate::openai::http_client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Chat client for a local Ollama server (`/api/chat`).
pub struct OllamaChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OllamaChat {
    /// Create a chat client for `model` served at `base_url`.
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&ChatRequest {
                model: &self.model,
                messages,
                stream: false,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenanimlError::Llm(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        debug!("Received {} characters", parsed.message.content.len());
        Ok(parsed.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
