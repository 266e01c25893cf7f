//! Configuration settings for Lorekeeper.

use crate::error::{LoreError, Result};
use crate::rag::TokenBudget;
use crate::retry::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub paths: PathSettings,
    pub extraction: ExtractionSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub tokenizer: TokenizerSettings,
    pub rag: RagSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// API key for the hosted models. `OPENAI_API_KEY` is used when unset.
    pub api_key: Option<String>,
    /// Log level used when no `-v` flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.lorekeeper".to_string(),
            api_key: None,
            log_level: "warn".to_string(),
        }
    }
}

/// Pipeline directories, one per stage output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Raw speech-to-text transcripts (one JSON file per episode).
    pub transcripts_dir: String,
    /// Transcripts after LLM correction.
    pub clean_dir: String,
    /// Extracted lore records.
    pub lore_dir: String,
    /// File that collects names of inputs that failed a batch stage.
    pub failed_log: String,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            transcripts_dir: "transcriptions".to_string(),
            clean_dir: "transcriptions_clean".to_string(),
            lore_dir: "lore_extracted".to_string(),
            failed_log: "failed_files.txt".to_string(),
        }
    }
}

/// Backoff strategy name as written in the config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    #[default]
    Exponential,
}

/// Retry settings for hosted model calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound for a single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Backoff strategy (fixed, exponential).
    pub backoff: BackoffKind,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2_000,
            max_delay_ms: 30_000,
            backoff: BackoffKind::Exponential,
        }
    }
}

impl RetrySettings {
    /// Convert into a runtime retry policy.
    pub fn policy(&self) -> RetryPolicy {
        let backoff = match self.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential { multiplier: 2 },
        };
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff,
        }
    }
}

/// Settings for the hosted cleanup and extraction stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Chat model used for transcript cleanup and lore extraction.
    pub model: String,
    /// Sampling temperature for extraction.
    pub temperature: f32,
    /// Pause after each successful request, in milliseconds (rate limiting).
    pub request_delay_ms: u64,
    /// Prefix stripped from filenames when deriving episode titles.
    pub series_prefix: String,
    /// Retry policy for failed requests.
    pub retry: RetrySettings,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            request_delay_ms: 4_000,
            series_prefix: "KAPITAN BOMBA - ".to_string(),
            retry: RetrySettings::default(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.lorekeeper/lore.db".to_string(),
        }
    }
}

/// Tokenizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct TokenizerSettings {
    /// Path to a HuggingFace `tokenizer.json`. Character counting is used when unset.
    pub path: Option<String>,
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for response generation.
    pub model: String,
    /// Number of fragments returned by similarity search.
    pub similarity_top_k: usize,
    /// Minimum similarity score for a fragment to be retrieved.
    pub min_score: f32,
    /// Token budget for the assembled context.
    pub token_budget: usize,
    /// A straddling fragment is only admitted partially above this many tokens.
    pub min_fragment_tokens: usize,
    /// Sampling temperature for answers.
    pub temperature: f32,
    /// Maximum tokens generated per answer.
    pub max_tokens: u32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            similarity_top_k: 3,
            min_score: 0.0,
            // 2048-token model window minus 512 reserved for prompt and answer
            token_budget: 1536,
            min_fragment_tokens: 20,
            temperature: 0.7,
            max_tokens: 256,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// Which batch stage a [`BatchConfig`] is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Raw transcripts to corrected transcripts.
    Cleanup,
    /// Corrected transcripts to lore records.
    Extraction,
}

/// Explicit configuration for one batch stage.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub model_name: String,
    pub api_key: Option<String>,
    pub retry: RetryPolicy,
    pub request_delay: Duration,
    pub failed_log: PathBuf,
}

/// Explicit configuration for retrieval and context assembly.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub similarity_top_k: usize,
    pub min_score: f32,
    pub budget: TokenBudget,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LoreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lorekeeper")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }

    /// Get the expanded lore record directory.
    pub fn lore_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.lore_dir)
    }

    /// Get the expanded tokenizer path, if one is configured.
    pub fn tokenizer_path(&self) -> Option<PathBuf> {
        self.tokenizer.path.as_deref().map(Self::expand_path)
    }

    /// Fill `general.api_key` from the environment when the config file has none.
    pub fn with_env_api_key(mut self) -> Self {
        if self.general.api_key.as_deref().map_or(true, str::is_empty) {
            self.general.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        self
    }

    /// Build the explicit configuration for a batch stage.
    pub fn batch_config(&self, stage: Stage) -> BatchConfig {
        let (input_dir, output_dir) = match stage {
            Stage::Cleanup => (&self.paths.transcripts_dir, &self.paths.clean_dir),
            Stage::Extraction => (&self.paths.clean_dir, &self.paths.lore_dir),
        };

        BatchConfig {
            input_dir: Self::expand_path(input_dir),
            output_dir: Self::expand_path(output_dir),
            model_name: self.extraction.model.clone(),
            api_key: self.general.api_key.clone(),
            retry: self.extraction.retry.policy(),
            request_delay: Duration::from_millis(self.extraction.request_delay_ms),
            failed_log: Self::expand_path(&self.paths.failed_log),
        }
    }

    /// Build the explicit configuration for retrieval and assembly.
    pub fn retrieval_config(&self) -> Result<RetrievalConfig> {
        if self.rag.similarity_top_k == 0 {
            return Err(LoreError::Config(
                "rag.similarity_top_k must be greater than zero".to_string(),
            ));
        }

        Ok(RetrievalConfig {
            similarity_top_k: self.rag.similarity_top_k,
            min_score: self.rag.min_score,
            budget: TokenBudget::new(self.rag.token_budget, self.rag.min_fragment_tokens)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [rag]
            token_budget = 800

            [extraction.retry]
            backoff = "fixed"
            "#,
        )
        .unwrap();

        assert_eq!(settings.rag.token_budget, 800);
        assert_eq!(settings.rag.similarity_top_k, 3);
        assert_eq!(settings.rag.min_fragment_tokens, 20);
        assert_eq!(settings.extraction.retry.backoff, BackoffKind::Fixed);
        assert_eq!(settings.extraction.retry.max_attempts, 3);
        assert_eq!(settings.paths.lore_dir, "lore_extracted");
    }

    #[test]
    fn test_batch_config_directories() {
        let settings = Settings::default();

        let cleanup = settings.batch_config(Stage::Cleanup);
        assert_eq!(cleanup.input_dir, PathBuf::from("transcriptions"));
        assert_eq!(cleanup.output_dir, PathBuf::from("transcriptions_clean"));

        let extraction = settings.batch_config(Stage::Extraction);
        assert_eq!(extraction.input_dir, PathBuf::from("transcriptions_clean"));
        assert_eq!(extraction.output_dir, PathBuf::from("lore_extracted"));
        assert_eq!(extraction.request_delay, Duration::from_secs(4));
    }

    #[test]
    fn test_retrieval_config_rejects_zero_budget() {
        let mut settings = Settings::default();
        settings.rag.token_budget = 0;
        assert!(settings.retrieval_config().is_err());

        settings.rag.token_budget = 1536;
        settings.rag.similarity_top_k = 0;
        assert!(settings.retrieval_config().is_err());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.rag.similarity_top_k = 7;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.rag.similarity_top_k, 7);
    }
}
