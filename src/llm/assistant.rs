//! Prompts for the wildlife conflict assistant.

use super::{strip_emphasis, ChatMessage, ChatModel};
use crate::config::Prompts;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Chat model wrapper exposing the assistant's two prompts.
#[derive(Clone)]
pub struct WildlifeAssistant {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl WildlifeAssistant {
    /// Create an assistant with the default prompts.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Ask the model which Indian state the text mentions.
    ///
    /// Returns the raw (emphasis-stripped) reply, e.g. `"Karnataka"` or `"None"`.
    /// The reply is not validated; callers match it against their own list.
    #[instrument(skip(self))]
    pub async fn extract_state(&self, query: &str) -> Result<String> {
        let system = self
            .prompts
            .render_with_custom(&self.prompts.assistant.state_extraction, &HashMap::new());

        let messages = [ChatMessage::system(system), ChatMessage::user(query)];
        let reply = self.model.chat(&messages).await?;
        let state = strip_emphasis(&reply);
        debug!("State extraction returned {:?}", state.trim());
        Ok(state)
    }

    /// Answer the query strictly from the supplied context.
    #[instrument(skip(self, context), fields(context_len = context.len()))]
    pub async fn answer(&self, query: &str, context: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        let system = self
            .prompts
            .render_with_custom(&self.prompts.assistant.answer_system, &vars);

        let messages = [ChatMessage::system(system), ChatMessage::user(query)];
        let reply = self.model.chat(&messages).await?;
        Ok(strip_emphasis(&reply))
    }
}
