//! Vector store abstraction for genaniml.
//!
//! Provides a trait-based interface for different vector database backends,
//! partitioned into named collections (one per state knowledge base), plus a
//! text-level [`KnowledgeBase`] that embeds documents and queries on the way in.

mod collection;
mod memory;
mod sqlite;

pub use collection::{validate_collection_name, Collection, KnowledgeBase, QueryResult};
pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::Settings;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Distance metric recorded for every collection.
pub const COSINE: &str = "cosine";

/// A document stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Collection this document belongs to.
    pub collection: String,
    /// Text content of this chunk.
    pub content: String,
    /// Source document name.
    pub source: String,
    /// Page number in the source document (1-based).
    pub page: u32,
    /// Order of this chunk within its page.
    pub chunk_order: i32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with a freshly generated ID.
    pub fn new(
        collection: String,
        content: String,
        source: String,
        page: u32,
        chunk_order: i32,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection,
            content,
            source,
            page,
            chunk_order,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Distance metric configured at creation.
    pub distance: String,
    /// Number of stored chunks.
    pub document_count: usize,
    /// When the collection was created.
    pub created_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection if it does not exist yet. Returns its current info.
    async fn create_collection(&self, name: &str) -> Result<CollectionInfo>;

    /// Check whether a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Delete a collection and every document in it.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// List all collections.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Insert documents into their collection.
    async fn insert(&self, docs: &[Document]) -> Result<usize>;

    /// Search a collection for the documents closest to an embedding.
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of documents in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

/// Create the vector store selected in configuration.
pub fn create_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
        "memory" => Arc::new(MemoryVectorStore::new()),
        _ => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
    };
    Ok(store)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score documents against a query, best first, keeping at most `limit`.
pub(crate) fn rank(
    docs: impl IntoIterator<Item = Document>,
    query_embedding: &[f32],
    limit: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = docs
        .into_iter()
        .map(|doc| {
            let score = cosine_similarity(query_embedding, &doc.embedding);
            SearchResult { document: doc, score }
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, embedding: Vec<f32>) -> Document {
        Document::new(
            "kerala_knowledge_base".to_string(),
            content.to_string(),
            "kerala.pdf".to_string(),
            1,
            0,
            embedding,
        )
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let docs = vec![
            doc("far", vec![0.0, 1.0]),
            doc("near", vec![1.0, 0.0]),
            doc("middle", vec![1.0, 1.0]),
        ];

        let ranked = rank(docs, &[1.0, 0.0], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].document.content, "near");
        assert_eq!(ranked[1].document.content, "middle");
    }

    #[test]
    fn test_document_ids_are_unique() {
        let a = doc("same", vec![1.0]);
        let b = doc("same", vec![1.0]);
        assert_ne!(a.id, b.id);
    }
}
