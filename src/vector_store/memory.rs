//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank_documents, Document, IndexedEpisode, SearchResult, VectorStore};
use crate::error::{LoreError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory vector store. Documents keep their insertion order.
pub struct MemoryVectorStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Document>>> {
        self.documents
            .read()
            .map_err(|e| LoreError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Document>>> {
        self.documents
            .write()
            .map_err(|e| LoreError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.write()?;
        for doc in docs {
            match store.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc.clone(),
                None => store.push(doc.clone()),
            }
        }
        Ok(docs.len())
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let docs = self.read()?;
        Ok(rank_documents(
            docs.iter().cloned(),
            query_embedding,
            limit,
            min_score,
        ))
    }

    async fn delete_by_source(&self, source_file: &str) -> Result<usize> {
        let mut docs = self.write()?;
        let initial_len = docs.len();
        docs.retain(|doc| doc.source_file != source_file);
        Ok(initial_len - docs.len())
    }

    async fn is_source_indexed(&self, source_file: &str) -> Result<bool> {
        let docs = self.read()?;
        Ok(docs.iter().any(|d| d.source_file == source_file))
    }

    async fn list_episodes(&self) -> Result<Vec<IndexedEpisode>> {
        let docs = self.read()?;

        let mut episode_map: HashMap<&str, IndexedEpisode> = HashMap::new();

        for doc in docs.iter() {
            let entry = episode_map
                .entry(doc.source_file.as_str())
                .or_insert_with(|| IndexedEpisode {
                    source_file: doc.source_file.clone(),
                    episode_id: doc.episode_id.clone(),
                    title: doc.title().to_string(),
                    fragment_count: 0,
                    indexed_at: doc.indexed_at,
                });

            entry.fragment_count += 1;
            if doc.indexed_at > entry.indexed_at {
                entry.indexed_at = doc.indexed_at;
            }
        }

        let mut episodes: Vec<IndexedEpisode> = episode_map.into_values().collect();
        episodes.sort_by(|a, b| {
            b.indexed_at
                .cmp(&a.indexed_at)
                .then_with(|| a.source_file.cmp(&b.source_file))
        });

        Ok(episodes)
    }

    async fn all_texts(&self) -> Result<Vec<String>> {
        let docs = self.read()?;
        Ok(docs.iter().map(|d| d.text.clone()).collect())
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
