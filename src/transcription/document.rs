//! Save transcripts as Word documents.

use crate::error::{GenanimlError, Result};
use docx_rs::{Docx, Paragraph, Run};
use std::path::Path;
use tracing::info;

/// What [`save_transcript_docx`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The transcript was empty; no file was written.
    NothingToSave,
}

/// Human-readable name for a speech language tag, used in document headings.
pub fn language_label(tag: &str) -> &str {
    match super::primary_language(tag).as_str() {
        "en" => "English",
        "kn" => "Kannada",
        "te" => "Telugu",
        "ta" => "Tamil",
        "ml" => "Malayalam",
        "hi" => "Hindi",
        _ => tag,
    }
}

/// Write `text` to a `.docx` under a `"<language> Speech to Text"` heading.
pub fn save_transcript_docx(path: &Path, language: &str, text: &str) -> Result<SaveOutcome> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(SaveOutcome::NothingToSave);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let docx = Docx::new()
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(format!("{} Speech to Text", language)).size(32).bold()),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)));

    let file = std::fs::File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| GenanimlError::Export(format!("Failed to write {}: {}", path.display(), e)))?;

    info!("Transcript saved to {}", path.display());
    Ok(SaveOutcome::Saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_writes_docx_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes/transcript.docx");

        let outcome = save_transcript_docx(&path, "Kannada", "ಆನೆಗಳು ಬೆಳೆ ನಾಶ ಮಾಡಿವೆ").unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_language_label() {
        assert_eq!(language_label("kn-IN"), "Kannada");
        assert_eq!(language_label("en-US"), "English");
        assert_eq!(language_label("xx-YY"), "xx-YY");
    }

    #[test]
    fn test_empty_text_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.docx");

        let outcome = save_transcript_docx(&path, "English", "   \n").unwrap();
        assert_eq!(outcome, SaveOutcome::NothingToSave);
        assert!(!path.exists());
    }
}
