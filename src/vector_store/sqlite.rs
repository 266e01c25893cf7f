//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! Metadata is stored as a JSON text column, embeddings as little-endian
//! f32 blobs.

use super::{rank_documents, Document, IndexedEpisode, SearchResult, VectorStore};
use crate::error::{LoreError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS fragments (
    id TEXT PRIMARY KEY,
    text TEXT NOT NULL,
    metadata TEXT NOT NULL,
    source_file TEXT NOT NULL,
    episode_id TEXT NOT NULL,
    fragment_order INTEGER NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_fragments_source_file ON fragments(source_file);
CREATE INDEX IF NOT EXISTS idx_fragments_indexed_at ON fragments(indexed_at);
"#;

const SELECT_DOCUMENT: &str = r#"
SELECT id, text, metadata, source_file, episode_id, fragment_order, embedding, indexed_at
FROM fragments
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) a SQLite vector store at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
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
            .map_err(|e| LoreError::VectorStore(format!("Failed to acquire lock: {}", e)))
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

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        let id_str: String = row.get(0)?;
        let metadata_json: String = row.get(2)?;
        let embedding_bytes: Vec<u8> = row.get(6)?;
        let indexed_at_str: String = row.get(7)?;

        let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_json)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(Document {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            text: row.get(1)?,
            metadata,
            source_file: row.get(3)?,
            episode_id: row.get(4)?,
            fragment_order: row.get(5)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: Self::parse_timestamp(&indexed_at_str),
        })
    }

    fn load_documents(conn: &Connection) -> Result<Vec<Document>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY source_file, fragment_order",
            SELECT_DOCUMENT
        ))?;

        let rows = stmt.query_map([], Self::row_to_document)?;

        let mut docs = Vec::new();
        for row in rows {
            match row {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!("Skipping unreadable fragment row: {}", e),
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, docs), fields(count = docs.len()))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for doc in docs {
            let metadata_json = serde_json::to_string(&doc.metadata)?;
            let embedding_bytes = Self::embedding_to_bytes(&doc.embedding);

            tx.execute(
                r#"
                INSERT OR REPLACE INTO fragments
                (id, text, metadata, source_file, episode_id, fragment_order, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    doc.id.to_string(),
                    doc.text,
                    metadata_json,
                    doc.source_file,
                    doc.episode_id,
                    doc.fragment_order,
                    embedding_bytes,
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} fragments", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;
        let docs = Self::load_documents(&conn)?;
        let results = rank_documents(docs, query_embedding, limit, min_score);

        debug!("Found {} matching fragments", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_source(&self, source_file: &str) -> Result<usize> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM fragments WHERE source_file = ?1",
            params![source_file],
        )?;

        debug!("Deleted {} fragments for {}", deleted, source_file);
        Ok(deleted)
    }

    async fn is_source_indexed(&self, source_file: &str) -> Result<bool> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM fragments WHERE source_file = ?1",
            params![source_file],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn list_episodes(&self) -> Result<Vec<IndexedEpisode>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT source_file, MIN(episode_id), MIN(json_extract(metadata, '$.title')),
                   COUNT(*) as fragment_count, MAX(indexed_at) as indexed_at
            FROM fragments
            GROUP BY source_file
            ORDER BY indexed_at DESC, source_file
            "#,
        )?;

        let episodes = stmt.query_map([], |row| {
            let title: Option<String> = row.get(2)?;
            let indexed_at_str: String = row.get(4)?;
            Ok(IndexedEpisode {
                source_file: row.get(0)?,
                episode_id: row.get(1)?,
                title: title.unwrap_or_default(),
                fragment_count: row.get(3)?,
                indexed_at: Self::parse_timestamp(&indexed_at_str),
            })
        })?;

        let result: Vec<IndexedEpisode> = episodes.filter_map(|e| e.ok()).collect();
        Ok(result)
    }

    async fn all_texts(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT text FROM fragments ORDER BY source_file, fragment_order")?;
        let texts = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(texts)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM fragments", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
