//! HuggingFace `tokenizers` backend.

use super::{TokenId, Tokenizer};
use crate::error::{LoreError, Result};
use std::path::Path;
use tracing::{info, instrument};

/// Tokenizer loaded from a HuggingFace `tokenizer.json`.
pub struct HuggingFaceTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HuggingFaceTokenizer {
    /// Load a tokenizer from a `tokenizer.json` file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            LoreError::Tokenizer(format!("Failed to load {}: {}", path.display(), e))
        })?;
        info!("Loaded tokenizer from {}", path.display());
        Ok(Self { inner })
    }
}

impl Tokenizer for HuggingFaceTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| LoreError::Tokenizer(format!("Encoding failed: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, tokens: &[TokenId]) -> Result<String> {
        self.inner
            .decode(tokens, true)
            .map_err(|e| LoreError::Tokenizer(format!("Decoding failed: {}", e)))
    }
}
