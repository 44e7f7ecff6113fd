//! Optical character recognition.

use crate::error::{GenanimlError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Trait for OCR engines.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract text from an image using a Tesseract-style language code (`eng`, `kan`).
    async fn extract_text(&self, image: &Path, language: &str) -> Result<String>;
}

/// OCR through the `tesseract` command-line tool.
pub struct TesseractOcr {
    tessdata_prefix: Option<PathBuf>,
}

impl TesseractOcr {
    /// Create an engine. When set, `tessdata_prefix` is exported as
    /// `TESSDATA_PREFIX` to every tesseract process.
    pub fn new(tessdata_prefix: Option<PathBuf>) -> Self {
        Self { tessdata_prefix }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("tesseract");
        if let Some(prefix) = &self.tessdata_prefix {
            cmd.env("TESSDATA_PREFIX", prefix);
        }
        cmd
    }

    /// Languages with installed training data.
    pub async fn list_languages(&self) -> Result<Vec<String>> {
        let output = self
            .command()
            .arg("--list-langs")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(tool_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenanimlError::ToolFailed(format!("tesseract --list-langs: {}", stderr)));
        }

        Ok(parse_language_list(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn tool_error(e: std::io::Error) -> GenanimlError {
    if e.kind() == std::io::ErrorKind::NotFound {
        GenanimlError::ToolNotFound("tesseract".into())
    } else {
        GenanimlError::Ocr(format!("tesseract execution failed: {e}"))
    }
}

/// Parse `tesseract --list-langs` output (a header line, then one code per line).
fn parse_language_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of"))
        .map(String::from)
        .collect()
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    #[instrument(skip(self), fields(image = %image.display()))]
    async fn extract_text(&self, image: &Path, language: &str) -> Result<String> {
        let output = self
            .command()
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(tool_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenanimlError::Ocr(format!("tesseract failed: {stderr}")));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Extracted {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_list() {
        let out = "List of available languages in \"/opt/homebrew/share/tessdata/\" (3):\neng\nkan\nosd\n";
        assert_eq!(parse_language_list(out), vec!["eng", "kan", "osd"]);
    }

    #[test]
    fn test_not_found_maps_to_tool_error() {
        let err = tool_error(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, GenanimlError::ToolNotFound(ref t) if t == "tesseract"));

        let err = tool_error(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(err, GenanimlError::Ocr(_)));
    }
}
