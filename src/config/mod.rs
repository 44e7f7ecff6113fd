//! Configuration module for genaniml.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts};
pub use settings::{
    AssistantSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, IngestSettings,
    LlmSettings, OcrSettings, PromptSettings, Settings, TranscriptionSettings,
    TranslationSettings, VectorStoreSettings,
};
