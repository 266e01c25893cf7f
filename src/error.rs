//! Error types for Lorekeeper.

use thiserror::Error;

/// Library-level error type for Lorekeeper operations.
#[derive(Error, Debug)]
pub enum LoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed record in {source_file}: {reason}")]
    MalformedRecord { source_file: String, reason: String },

    #[error("Transcript cleanup failed: {0}")]
    Cleanup(String),

    #[error("Lore extraction failed: {0}")]
    Extraction(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LoreError {
    /// Build a [`LoreError::MalformedRecord`] for the given source file.
    pub fn malformed(source_file: impl Into<String>, reason: impl ToString) -> Self {
        LoreError::MalformedRecord {
            source_file: source_file.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether retrying the failed operation may succeed.
    ///
    /// Remote API failures are transient; bad input and configuration are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LoreError::OpenAI(_)
                | LoreError::Http(_)
                | LoreError::Cleanup(_)
                | LoreError::Extraction(_)
                | LoreError::Embedding(_)
        )
    }
}

/// Result type alias for Lorekeeper operations.
pub type Result<T> = std::result::Result<T, LoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LoreError::OpenAI("rate limited".to_string()).is_transient());
        assert!(LoreError::Extraction("empty response".to_string()).is_transient());
        assert!(!LoreError::malformed("a.json", "missing title").is_transient());
        assert!(!LoreError::Config("bad".to_string()).is_transient());
    }

    #[test]
    fn test_malformed_display() {
        let err = LoreError::malformed("ep1.json", "missing field `title`");
        assert_eq!(
            err.to_string(),
            "Malformed record in ep1.json: missing field `title`"
        );
    }
}
