//! In-memory vector store implementation.
//!
//! Useful for testing and throwaway sessions.

use super::{rank, CollectionInfo, Document, SearchResult, VectorStore, COSINE};
use crate::error::{GenanimlError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

struct MemoryCollection {
    created_at: DateTime<Utc>,
    documents: Vec<Document>,
}

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> GenanimlError {
        GenanimlError::VectorStore(format!("Failed to acquire lock: {}", e))
    }

    fn missing(name: &str) -> GenanimlError {
        GenanimlError::VectorStore(format!("Collection {} does not exist", name))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<CollectionInfo> {
        let mut collections = self.collections.write().map_err(Self::lock_error)?;
        let entry = collections
            .entry(name.to_string())
            .or_insert_with(|| MemoryCollection {
                created_at: Utc::now(),
                documents: Vec::new(),
            });

        Ok(CollectionInfo {
            name: name.to_string(),
            distance: COSINE.to_string(),
            document_count: entry.documents.len(),
            created_at: entry.created_at,
        })
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let collections = self.collections.read().map_err(Self::lock_error)?;
        Ok(collections.contains_key(name))
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().map_err(Self::lock_error)?;
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Self::missing(name))
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections = self.collections.read().map_err(Self::lock_error)?;
        let mut infos: Vec<CollectionInfo> = collections
            .iter()
            .map(|(name, c)| CollectionInfo {
                name: name.clone(),
                distance: COSINE.to_string(),
                document_count: c.documents.len(),
                created_at: c.created_at,
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    async fn insert(&self, docs: &[Document]) -> Result<usize> {
        let mut collections = self.collections.write().map_err(Self::lock_error)?;
        if let Some(doc) = docs.iter().find(|d| !collections.contains_key(&d.collection)) {
            return Err(Self::missing(&doc.collection));
        }
        for doc in docs {
            let collection = collections
                .get_mut(&doc.collection)
                .ok_or_else(|| Self::missing(&doc.collection))?;
            collection.documents.push(doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().map_err(Self::lock_error)?;
        let collection = collections
            .get(collection)
            .ok_or_else(|| Self::missing(collection))?;

        Ok(rank(collection.documents.iter().cloned(), query_embedding, limit))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(Self::lock_error)?;
        collections
            .get(collection)
            .map(|c| c.documents.len())
            .ok_or_else(|| Self::missing(collection))
    }
}
