//! Text-level access to named collections.
//!
//! [`KnowledgeBase`] pairs a [`VectorStore`] with an [`Embedder`] so callers
//! add and query plain text, the way a document-embedding datastore would.

use super::{CollectionInfo, Document, VectorStore};
use crate::chunking::TextChunk;
use crate::embedding::Embedder;
use crate::error::{GenanimlError, Result};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// A chunk returned from a similarity query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Stored chunk ID.
    pub id: Uuid,
    /// Chunk text.
    pub content: String,
    /// Source document name.
    pub source: String,
    /// Page in the source document.
    pub page: u32,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Check that a collection name is 3-63 characters of `[A-Za-z0-9._-]`,
/// starting and ending with an alphanumeric character.
pub fn validate_collection_name(name: &str) -> Result<()> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{1,61}[A-Za-z0-9]$").expect("valid collection name pattern")
    });

    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(GenanimlError::InvalidInput(format!(
            "Invalid collection name '{}': use 3-63 letters, digits, '.', '_' or '-', starting and ending with a letter or digit",
            name
        )))
    }
}

/// Entry point to the per-state collections.
#[derive(Clone)]
pub struct KnowledgeBase {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl KnowledgeBase {
    /// Create a knowledge base over a store and embedder.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Get a reference to the underlying vector store.
    pub fn store(&self) -> Arc<dyn VectorStore> {
        self.store.clone()
    }

    /// Open a collection, creating it with the cosine metric if needed.
    #[instrument(skip(self))]
    pub async fn create_or_open(&self, name: &str) -> Result<Collection> {
        validate_collection_name(name)?;
        let info = self.store.create_collection(name).await?;
        debug!("Opened collection {} ({} documents)", name, info.document_count);

        Ok(Collection {
            name: name.to_string(),
            store: self.store.clone(),
            embedder: self.embedder.clone(),
        })
    }

    /// Delete a collection and all of its chunks. Irreversible.
    #[instrument(skip(self))]
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(GenanimlError::InvalidInput(
                "Please provide a collection name to delete.".to_string(),
            ));
        }
        self.store.delete_collection(name).await
    }

    /// List every collection with its chunk count.
    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        self.store.list_collections().await
    }
}

/// Handle on one named collection.
#[derive(Clone)]
pub struct Collection {
    name: String,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl Collection {
    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embed and insert chunks, each under a freshly generated ID.
    ///
    /// There is no de-duplication: adding the same text twice stores it twice.
    #[instrument(skip(self, chunks), fields(collection = %self.name, count = chunks.len()))]
    pub async fn add_documents(&self, chunks: &[TextChunk]) -> Result<Vec<Uuid>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(GenanimlError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let documents: Vec<Document> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Document::new(
                    self.name.clone(),
                    chunk.content.clone(),
                    chunk.source.clone(),
                    chunk.page,
                    chunk.order,
                    embedding,
                )
            })
            .collect();

        let ids = documents.iter().map(|d| d.id).collect();
        self.store.insert(&documents).await?;

        info!("Documents added to {}", self.name);
        Ok(ids)
    }

    /// Return up to `n` chunks most similar to `text`, best first.
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn query(&self, text: &str, n: usize) -> Result<Vec<QueryResult>> {
        if self.store.count(&self.name).await? == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(text).await?;
        let results = self.store.search(&self.name, &embedding, n).await?;

        Ok(results
            .into_iter()
            .map(|r| QueryResult {
                id: r.document.id,
                content: r.document.content,
                source: r.document.source,
                page: r.document.page,
                score: r.score,
            })
            .collect())
    }

    /// Number of chunks stored.
    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::KeywordEmbedder;
    use crate::vector_store::MemoryVectorStore;
    use std::sync::atomic::Ordering;

    fn knowledge_base() -> (KnowledgeBase, Arc<KeywordEmbedder>) {
        let embedder = Arc::new(KeywordEmbedder::new());
        let kb = KnowledgeBase::new(Arc::new(MemoryVectorStore::new()), embedder.clone());
        (kb, embedder)
    }

    #[test]
    fn test_collection_name_validation() {
        assert!(validate_collection_name("karnataka_knowledge_base").is_ok());
        assert!(validate_collection_name("tamil-nadu.v2").is_ok());
        assert!(validate_collection_name("ab").is_err());
        assert!(validate_collection_name("_leading").is_err());
        assert!(validate_collection_name("has space").is_err());
        assert!(validate_collection_name("").is_err());
    }

    #[tokio::test]
    async fn test_add_and_query() {
        let (kb, _) = knowledge_base();
        let collection = kb.create_or_open("karnataka_knowledge_base").await.unwrap();

        let ids = collection
            .add_documents(&[
                TextChunk::new("Elephant damage to crop fields is compensated", 1, "k.pdf", 0),
                TextChunk::new("Snake bite victims receive ex gratia", 1, "k.pdf", 1),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let results = collection.query("elephant ate my crop", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.starts_with("Elephant"));
    }

    #[tokio::test]
    async fn test_query_empty_collection_skips_embedding() {
        let (kb, embedder) = knowledge_base();
        let collection = kb.create_or_open("kerala_knowledge_base").await.unwrap();

        let results = collection.query("anything", 10).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_or_open_is_idempotent() {
        let (kb, _) = knowledge_base();
        let first = kb.create_or_open("kerala_knowledge_base").await.unwrap();
        first
            .add_documents(&[TextChunk::new("Leopard sighting protocol", 2, "kerala.pdf", 0)])
            .await
            .unwrap();

        let second = kb.create_or_open("kerala_knowledge_base").await.unwrap();
        assert_eq!(second.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reingest_duplicates() {
        let (kb, _) = knowledge_base();
        let collection = kb.create_or_open("telangana_knowledge_base").await.unwrap();
        let chunk = [TextChunk::new("Same paragraph", 1, "t.pdf", 0)];

        collection.add_documents(&chunk).await.unwrap();
        collection.add_documents(&chunk).await.unwrap();
        assert_eq!(collection.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_requires_name() {
        let (kb, _) = knowledge_base();
        let err = kb.delete_collection("").await.unwrap_err();
        assert!(matches!(err, GenanimlError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_delete_collection_removes_chunks() {
        let (kb, _) = knowledge_base();
        let collection = kb.create_or_open("kerala_knowledge_base").await.unwrap();
        collection
            .add_documents(&[TextChunk::new("text", 1, "k.pdf", 0)])
            .await
            .unwrap();

        kb.delete_collection("kerala_knowledge_base").await.unwrap();
        assert!(kb.list_collections().await.unwrap().is_empty());

        let reopened = kb.create_or_open("kerala_knowledge_base").await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 0);
    }
}
