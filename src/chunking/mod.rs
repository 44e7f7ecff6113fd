//! Paragraph chunking for extracted page text.
//!
//! OCR output is split on blank lines so each chunk is one paragraph, the unit
//! stored in the knowledge base.

use serde::{Deserialize, Serialize};

/// Paragraph separator in OCR output.
const PARAGRAPH_BREAK: &str = "\n\n";

/// A paragraph of extracted text with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Page the text came from (1-based).
    pub page: u32,
    /// Source document name.
    pub source: String,
    /// Order of this chunk within its page.
    pub order: i32,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(content: impl Into<String>, page: u32, source: impl Into<String>, order: i32) -> Self {
        Self {
            content: content.into(),
            page,
            source: source.into(),
            order,
        }
    }
}

/// Split text into trimmed, non-empty paragraphs.
pub fn chunk_text(text: &str) -> Vec<String> {
    text.trim()
        .split(PARAGRAPH_BREAK)
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .map(str::to_string)
        .collect()
}

/// Wrap a page's paragraphs as chunks.
pub fn page_chunks(paragraphs: &[String], page: u32, source: &str) -> Vec<TextChunk> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(i, para)| TextChunk::new(para.clone(), page, source, i as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_split_paragraphs() {
        assert_eq!(chunk_text("A\n\nB\n\n\n\nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_paragraphs_are_trimmed() {
        let text = "\n\n  Elephant raid compensation  \n\n\tCrop loss claims\n";
        assert_eq!(
            chunk_text(text),
            vec!["Elephant raid compensation", "Crop loss claims"]
        );
    }

    #[test]
    fn test_single_newlines_stay_inside_paragraph() {
        let chunks = chunk_text("line one\nline two\n\nnext");
        assert_eq!(chunks, vec!["line one\nline two", "next"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("").is_empty());
        assert!(chunk_text("   \n\n \n\n").is_empty());
    }

    #[test]
    fn test_page_chunks_keep_order() {
        let paras = vec!["first".to_string(), "second".to_string()];
        let chunks = page_chunks(&paras, 3, "kerala.pdf");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], TextChunk::new("second", 3, "kerala.pdf", 1));
    }
}
