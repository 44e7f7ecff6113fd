//! Text translation between short language codes (`kn`, `en`, `te`, `ta`, `auto`).

mod google;

pub use google::GoogleTranslator;

use crate::error::Result;
use async_trait::async_trait;
use tracing::warn;

/// Trait for translation services.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target`.
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Translate, falling back to the input text on any failure.
pub async fn translate_or_original(
    translator: &dyn Translator,
    text: &str,
    source: &str,
    target: &str,
) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    match translator.translate(text, source, target).await {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Translation {} -> {} failed, keeping original: {}", source, target, e);
            text.to_string()
        }
    }
}
