//! Configuration settings for genaniml.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub transcription: TranscriptionSettings,
    pub translation: TranslationSettings,
    pub ocr: OcrSettings,
    pub ingest: IngestSettings,
    pub assistant: AssistantSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.genaniml".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Local chat model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Chat model used for state extraction and answers.
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma2:2b".to_string(),
        }
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local embeddings served by Ollama (default).
    #[default]
    Ollama,
    /// Hosted OpenAI embeddings.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" | "local" => Ok(EmbeddingProvider::Ollama),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::Ollama => write!(f, "ollama"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (ollama, openai).
    pub provider: EmbeddingProvider,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Base URL for the Ollama provider.
    pub base_url: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            base_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.genaniml/knowledge.db".to_string(),
        }
    }
}

/// Speech recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Hosted recognition model.
    pub model: String,
    /// Default recognition language (BCP-47 tag, e.g. en-US, kn-IN).
    pub language: String,
    /// Longest phrase captured per recognition call in continuous mode.
    pub phrase_time_limit_seconds: u32,
    /// Capture sample rate for microphone input.
    pub sample_rate: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: "en-US".to_string(),
            phrase_time_limit_seconds: 8,
            sample_rate: 44100,
        }
    }
}

/// Translation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Translation endpoint.
    pub endpoint: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        }
    }
}

/// OCR and page rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language data directory (exported as TESSDATA_PREFIX).
    pub tessdata_prefix: String,
    /// Resolution used when rasterising PDF pages.
    pub dpi: u32,
    /// Directory receiving original and processed page images.
    pub output_dir: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tessdata_prefix: "/opt/homebrew/share/tessdata/".to_string(),
            dpi: 200,
            output_dir: "output_images".to_string(),
        }
    }
}

/// Document ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Pages processed concurrently (1 = sequential).
    pub max_concurrent_pages: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_concurrent_pages: 1,
        }
    }
}

/// Response orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// States with a knowledge base, scanned in order.
    pub states: Vec<String>,
    /// State used when extraction finds none of `states`.
    pub fallback_state: String,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    /// Answer returned when retrieval finds nothing.
    pub no_results_message: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            states: vec![
                "kerala".to_string(),
                "karnataka".to_string(),
                "telangana".to_string(),
            ],
            fallback_state: "karnataka".to_string(),
            top_k: 10,
            no_results_message: "No relevant information found in the database.".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GenanimlError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("genaniml")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded page image output directory.
    pub fn ocr_output_dir(&self) -> PathBuf {
        Self::expand_path(&self.ocr.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_assistant_settings() {
        let settings = Settings::default();
        assert_eq!(settings.assistant.states, vec!["kerala", "karnataka", "telangana"]);
        assert_eq!(settings.assistant.fallback_state, "karnataka");
        assert_eq!(settings.assistant.top_k, 10);
        assert_eq!(settings.llm.model, "gemma2:2b");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [llm]
            model = "llama3.2:1b"

            [embedding]
            provider = "openai"
            "#,
        )
        .unwrap();

        assert_eq!(settings.llm.model, "llama3.2:1b");
        assert_eq!(settings.llm.base_url, "http://localhost:11434");
        assert_eq!(settings.embedding.provider, EmbeddingProvider::OpenAI);
        assert_eq!(settings.ocr.dpi, 200);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.assistant.top_k = 4;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.assistant.top_k, 4);
    }

    #[test]
    fn test_embedding_provider_parse() {
        assert_eq!("ollama".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Ollama);
        assert_eq!("OpenAI".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::OpenAI);
        assert!("other".parse::<EmbeddingProvider>().is_err());
    }
}
