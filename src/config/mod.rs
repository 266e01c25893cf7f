//! Configuration module for Lorekeeper.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{CleanupPrompts, ExtractionPrompts, Prompts, RagPrompts};
pub use settings::{
    BackoffKind, BatchConfig, EmbeddingSettings, ExtractionSettings, GeneralSettings,
    PathSettings, PromptSettings, RagSettings, RetrievalConfig, RetrySettings, Settings, Stage,
    TokenizerSettings, VectorStoreSettings,
};
