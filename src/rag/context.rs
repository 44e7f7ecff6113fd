//! Context assembly from retrieved chunks.

use crate::vector_store::QueryResult;
use serde::Serialize;

/// A retrieved chunk, as reported back to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ContextChunk {
    pub content: String,
    /// Source document name.
    pub source: String,
    pub page: u32,
    /// Cosine similarity to the question.
    pub score: f32,
}

impl From<QueryResult> for ContextChunk {
    fn from(result: QueryResult) -> Self {
        Self {
            content: result.content,
            source: result.source,
            page: result.page,
            score: result.score,
        }
    }
}

/// Space-join chunk texts in retrieval order. Nothing is dropped or reordered.
pub fn build_context(chunks: &[ContextChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
