//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway through a batch.

use crate::config::Settings;
use crate::error::{LoreError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Batch stages call the hosted model for every file.
    Batch,
    /// Indexing needs embeddings.
    Index,
    /// Asking questions needs embeddings and generation.
    Ask,
    /// Search needs query embeddings.
    Search,
    /// Statistics only read the local store.
    Stats,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Batch | Operation::Index | Operation::Ask | Operation::Search => {
            check_api_key(settings)?;
            check_tokenizer(settings)?;
        }
        Operation::Stats => {
            check_tokenizer(settings)?;
        }
    }
    Ok(())
}

/// Check if an OpenAI API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    match settings.general.api_key.as_deref() {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(LoreError::Config(
            "No API key configured. Set OPENAI_API_KEY or general.api_key in the config file"
                .to_string(),
        )),
    }
}

/// Check that a configured tokenizer file exists.
fn check_tokenizer(settings: &Settings) -> Result<()> {
    match settings.tokenizer_path() {
        Some(path) if !path.exists() => Err(LoreError::Config(format!(
            "Tokenizer file not found: {}",
            path.display()
        ))),
        _ => Ok(()),
    }
}
