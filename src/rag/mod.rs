//! RAG (Retrieval-Augmented Generation) over the lore knowledge base.
//!
//! Retrieval returns ranked fragments, the assembler fits them into a token
//! budget, and the engine asks the chat model to answer from that context.

pub mod assembler;
mod engine;

pub use assembler::{assemble, AssembledContext, TokenBudget, DEFAULT_MIN_FRAGMENT_TOKENS};
pub use engine::{extract_answer, Generator, OpenAIGenerator, RagAnswer, RagEngine};

use crate::vector_store::SearchResult;
use std::collections::BTreeMap;

/// A fragment returned by similarity search, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    /// Fragment text.
    pub text: String,
    /// Fragment metadata envelope.
    pub metadata: BTreeMap<String, String>,
    /// Similarity score.
    pub score: f32,
    /// 0-based position in the result list.
    pub rank: usize,
}

impl RetrievedChunk {
    /// Build ranked chunks from ordered search results.
    pub fn from_results(results: Vec<SearchResult>) -> Vec<Self> {
        results
            .into_iter()
            .enumerate()
            .map(|(rank, r)| Self {
                text: r.document.text,
                metadata: r.document.metadata,
                score: r.score,
                rank,
            })
            .collect()
    }

    fn meta(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.meta("title")
    }

    pub fn episode_id(&self) -> &str {
        self.meta("episode_id")
    }

    pub fn kind(&self) -> &str {
        self.meta("type")
    }
}

/// Format chunks as a source list for display to the user.
pub fn format_sources(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "[{}] {} (ep. {}, {}, score: {:.2})",
                chunk.rank + 1,
                chunk.title(),
                chunk.episode_id(),
                chunk.kind(),
                chunk.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
