//! Vector store abstraction for Lorekeeper.
//!
//! Provides a trait-based interface for different vector database backends.
//! Rows are lore fragments with their embedding, grouped by the record file
//! they were normalized from.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use crate::normalize::Fragment;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A fragment stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Fragment text.
    pub text: String,
    /// Fragment metadata envelope.
    pub metadata: BTreeMap<String, String>,
    /// Record file the fragment came from.
    pub source_file: String,
    /// Episode the fragment belongs to.
    pub episode_id: String,
    /// Position of the fragment within its record.
    pub fragment_order: i32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a document from a normalized fragment and its embedding.
    pub fn from_fragment(fragment: &Fragment, fragment_order: i32, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: fragment.text.clone(),
            metadata: fragment.metadata.clone(),
            source_file: fragment.source_file().to_string(),
            episode_id: fragment.episode_id().to_string(),
            fragment_order,
            embedding,
            indexed_at: Utc::now(),
        }
    }

    /// Episode title from the metadata envelope.
    pub fn title(&self) -> &str {
        self.metadata.get("title").map(String::as_str).unwrap_or_default()
    }

    /// Fragment type from the metadata envelope.
    pub fn kind(&self) -> &str {
        self.metadata.get("type").map(String::as_str).unwrap_or_default()
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

/// Summary information about an indexed episode record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedEpisode {
    /// Record file name.
    pub source_file: String,
    /// Episode ID.
    pub episode_id: String,
    /// Episode title.
    pub title: String,
    /// Number of indexed fragments.
    pub fragment_count: u32,
    /// When the record was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk upsert documents.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for similar documents, best first.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, f32::MIN).await
    }

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete every document normalized from `source_file`.
    async fn delete_by_source(&self, source_file: &str) -> Result<usize>;

    /// Check if a record file is indexed.
    async fn is_source_indexed(&self, source_file: &str) -> Result<bool>;

    /// List indexed episode records, most recently indexed first.
    async fn list_episodes(&self) -> Result<Vec<IndexedEpisode>>;

    /// Texts of every stored document.
    async fn all_texts(&self) -> Result<Vec<String>>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
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

/// Score, filter, order and cut documents. Ties keep insertion order.
fn rank_documents<I>(
    docs: I,
    query_embedding: &[f32],
    limit: usize,
    min_score: f32,
) -> Vec<SearchResult>
where
    I: IntoIterator<Item = Document>,
{
    let mut results: Vec<SearchResult> = docs
        .into_iter()
        .map(|document| {
            let score = cosine_similarity(query_embedding, &document.embedding);
            SearchResult { document, score }
        })
        .filter(|r| r.score >= min_score)
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}
