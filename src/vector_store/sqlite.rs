//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity. Each
//! state knowledge base holds a few hundred paragraphs, so a linear scan per
//! query is fast enough.

use super::{rank, CollectionInfo, Document, SearchResult, VectorStore, COSINE};
use crate::error::{GenanimlError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY,
        distance TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        content TEXT NOT NULL,
        source TEXT NOT NULL,
        page INTEGER NOT NULL,
        chunk_order INTEGER NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a persistent store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| GenanimlError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn collection_info(conn: &Connection, name: &str) -> Result<Option<CollectionInfo>> {
        let info = conn
            .query_row(
                r#"
                SELECT c.name, c.distance, c.created_at,
                       (SELECT COUNT(*) FROM documents d WHERE d.collection = c.name)
                FROM collections c
                WHERE c.name = ?1
                "#,
                params![name],
                |row| {
                    let created_at: String = row.get(2)?;
                    let count: i64 = row.get(3)?;
                    Ok(CollectionInfo {
                        name: row.get(0)?,
                        distance: row.get(1)?,
                        document_count: count as usize,
                        created_at: Self::parse_timestamp(&created_at),
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    fn missing(name: &str) -> GenanimlError {
        GenanimlError::VectorStore(format!("Collection {} does not exist", name))
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str) -> Result<CollectionInfo> {
        let conn = self.lock()?;

        let created = conn.execute(
            "INSERT OR IGNORE INTO collections (name, distance, created_at) VALUES (?1, ?2, ?3)",
            params![name, COSINE, Utc::now().to_rfc3339()],
        )?;
        if created > 0 {
            info!("Created collection {}", name);
        }

        Self::collection_info(&conn, name)?.ok_or_else(|| Self::missing(name))
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM collections WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let removed = tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        if removed == 0 {
            return Err(Self::missing(name));
        }
        let deleted = tx.execute("DELETE FROM documents WHERE collection = ?1", params![name])?;

        tx.commit()?;
        info!("Deleted collection {} ({} documents)", name, deleted);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.name, c.distance, c.created_at, COUNT(d.id)
            FROM collections c
            LEFT JOIN documents d ON d.collection = c.name
            GROUP BY c.name
            ORDER BY c.name
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let created_at: String = row.get(2)?;
            let count: i64 = row.get(3)?;
            Ok(CollectionInfo {
                name: row.get(0)?,
                distance: row.get(1)?,
                document_count: count as usize,
                created_at: Self::parse_timestamp(&created_at),
            })
        })?;

        let result: Vec<CollectionInfo> = rows.filter_map(|r| r.ok()).collect();
        Ok(result)
    }

    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn insert(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            let exists: i64 = tx.query_row(
                "SELECT COUNT(*) FROM collections WHERE name = ?1",
                params![doc.collection],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(Self::missing(&doc.collection));
            }

            tx.execute(
                r#"
                INSERT INTO documents
                (id, collection, content, source, page, chunk_order, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    doc.id.to_string(),
                    doc.collection,
                    doc.content,
                    doc.source,
                    doc.page,
                    doc.chunk_order,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Inserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        if Self::collection_info(&conn, collection)?.is_none() {
            return Err(Self::missing(collection));
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT id, collection, content, source, page, chunk_order, embedding, indexed_at
            FROM documents
            WHERE collection = ?1
            "#,
        )?;

        let docs = stmt.query_map(params![collection], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(6)?;
            let indexed_at: String = row.get(7)?;

            Ok(Document {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                collection: row.get(1)?,
                content: row.get(2)?,
                source: row.get(3)?,
                page: row.get(4)?,
                chunk_order: row.get(5)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                indexed_at: Self::parse_timestamp(&indexed_at),
            })
        })?;

        let results = rank(docs.filter_map(|d| d.ok()), query_embedding, limit);

        debug!("Found {} matching documents in {}", results.len(), collection);
        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        Self::collection_info(&conn, collection)?
            .map(|info| info.document_count)
            .ok_or_else(|| Self::missing(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(collection: &str, content: &str, embedding: Vec<f32>) -> Document {
        Document::new(
            collection.to_string(),
            content.to_string(),
            "karnataka.pdf".to_string(),
            2,
            0,
            embedding,
        )
    }

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.create_collection("karnataka_knowledge_base").await.unwrap();

        store
            .insert(&[doc("karnataka_knowledge_base", "Elephant crop loss claim", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();

        let collections = store.list_collections().await.unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].name, "karnataka_knowledge_base");
        assert_eq!(collections[0].document_count, 1);
        assert_eq!(collections[0].distance, "cosine");

        let results = store
            .search("karnataka_knowledge_base", &[1.0, 0.0, 0.0], 10)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].document.page, 2);

        store.delete_collection("karnataka_knowledge_base").await.unwrap();
        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_collection_search_is_empty() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.create_collection("telangana_knowledge_base").await.unwrap();

        let results = store
            .search("telangana_knowledge_base", &[1.0, 0.0], 10)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_content_is_not_deduplicated() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.create_collection("kerala_knowledge_base").await.unwrap();

        let first = doc("kerala_knowledge_base", "same paragraph", vec![1.0]);
        let second = doc("kerala_knowledge_base", "same paragraph", vec![1.0]);
        store.insert(&[first, second]).await.unwrap();

        assert_eq!(store.count("kerala_knowledge_base").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_collection_fails() {
        let store = SqliteVectorStore::in_memory().unwrap();
        assert!(store.delete_collection("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store.create_collection("kerala_knowledge_base").await.unwrap();
            store
                .insert(&[doc("kerala_knowledge_base", "persisted", vec![0.5, 0.5])])
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.count("kerala_knowledge_base").await.unwrap(), 1);
    }

    #[test]
    fn test_embedding_bytes_roundtrip() {
        let embedding = vec![0.25f32, -1.5, 3.0];
        let bytes = SqliteVectorStore::embedding_to_bytes(&embedding);
        assert_eq!(SqliteVectorStore::bytes_to_embedding(&bytes), embedding);
    }
}
