//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{GenanimlError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions needs the embedding backend.
    Ask,
    /// Speech recognition needs the OpenAI API key.
    Transcribe,
    /// PDF ingestion needs poppler, tesseract and the embedding backend.
    Ingest,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask => {
            check_embedding(settings)?;
        }
        Operation::Transcribe => {
            check_api_key()?;
        }
        Operation::Ingest => {
            check_tool("pdftoppm", "-v")?;
            check_tool("tesseract", "--version")?;
            check_embedding(settings)?;
        }
    }
    Ok(())
}

fn check_embedding(settings: &Settings) -> Result<()> {
    match settings.embedding.provider {
        EmbeddingProvider::OpenAI => check_api_key(),
        EmbeddingProvider::Ollama => Ok(()),
    }
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(GenanimlError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(GenanimlError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that an external tool can be launched.
///
/// Only a missing binary fails: `pdftoppm -v` exits non-zero on older poppler.
fn check_tool(name: &str, version_arg: &str) -> Result<()> {
    match Command::new(name).arg(version_arg).output() {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GenanimlError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(GenanimlError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
