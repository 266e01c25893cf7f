//! Tokenizers used to measure and cut text against a token budget.
//!
//! Token budgets are only meaningful when the tokenizer matches the model
//! that consumes the text, so the HuggingFace backend loads the model's own
//! `tokenizer.json`. The character backend counts Unicode scalar values and
//! round-trips exactly.

#[cfg(feature = "hf-tokenizer")]
mod huggingface;

#[cfg(feature = "hf-tokenizer")]
pub use huggingface::HuggingFaceTokenizer;

use crate::error::{LoreError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Opaque token unit.
pub type TokenId = u32;

/// Maps text to tokens and back.
pub trait Tokenizer: Send + Sync {
    /// Encode text into tokens, without special tokens.
    fn encode(&self, text: &str) -> Result<Vec<TokenId>>;

    /// Decode tokens back into text, skipping special tokens.
    fn decode(&self, tokens: &[TokenId]) -> Result<String>;

    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }
}

/// One token per Unicode scalar value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        Ok(text.chars().map(|c| c as TokenId).collect())
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String> {
        tokens
            .iter()
            .map(|&t| {
                char::from_u32(t)
                    .ok_or_else(|| LoreError::Tokenizer(format!("Invalid character token: {}", t)))
            })
            .collect()
    }

    fn count(&self, text: &str) -> Result<usize> {
        Ok(text.chars().count())
    }
}

/// Create the tokenizer for an optional `tokenizer.json` path.
pub fn create_tokenizer(path: Option<&Path>) -> Result<Arc<dyn Tokenizer>> {
    match path {
        Some(path) => load_from_file(path),
        None => {
            warn!("No tokenizer configured, counting characters as tokens");
            Ok(Arc::new(CharTokenizer))
        }
    }
}

#[cfg(feature = "hf-tokenizer")]
fn load_from_file(path: &Path) -> Result<Arc<dyn Tokenizer>> {
    Ok(Arc::new(HuggingFaceTokenizer::from_file(path)?))
}

#[cfg(not(feature = "hf-tokenizer"))]
fn load_from_file(path: &Path) -> Result<Arc<dyn Tokenizer>> {
    Err(LoreError::Config(format!(
        "Tokenizer file {} configured but the hf-tokenizer feature is disabled",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_tokenizer_roundtrip() {
        let tokenizer = CharTokenizer;
        let tokens = tokenizer.encode("Kurwinox ŻÓŁW").unwrap();
        assert_eq!(tokens.len(), 13);
        assert_eq!(tokenizer.decode(&tokens[..8]).unwrap(), "Kurwinox");
        assert_eq!(tokenizer.count("żółw").unwrap(), 4);
    }

    #[test]
    fn test_char_tokenizer_rejects_invalid_token() {
        assert!(CharTokenizer.decode(&[0xD800]).is_err());
    }

    #[test]
    fn test_default_tokenizer_is_char() {
        let tokenizer = create_tokenizer(None).unwrap();
        assert_eq!(tokenizer.count("abc").unwrap(), 3);
    }

    #[test]
    fn test_missing_tokenizer_file() {
        let result = create_tokenizer(Some(Path::new("/nonexistent/tokenizer.json")));
        assert!(result.is_err());
    }
}
