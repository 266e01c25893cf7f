//! Lorekeeper - a lore knowledge base built from episode transcripts
//!
//! A CLI tool and library that turns speech-to-text transcripts of a show
//! into a searchable knowledge base and answers questions from it.
//!
//! # Overview
//!
//! Lorekeeper allows you to:
//! - Correct raw transcripts with a hosted language model
//! - Extract structured lore records (characters, places, facts, quotes)
//! - Flatten records into fragments and index them for semantic search
//! - Ask questions and get answers grounded in a token-budgeted context
//!
//! # Architecture
//!
//! - `record` - Lore record data model and ingestion
//! - `normalize` - Record to fragment flattening
//! - `extraction` - Transcript cleanup and lore extraction
//! - `tokenizer` - Token counting for the context budget
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `rag` - Context assembly and question answering
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use lorekeeper::config::Settings;
//! use lorekeeper::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?.with_env_api_key();
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let report = orchestrator.index_lore(false).await?;
//!     println!("Indexed {} fragments", report.fragments_indexed);
//!
//!     let answer = orchestrator.rag_engine(None)?.answer("Who is Torpeda?").await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extraction;
pub mod normalize;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod record;
pub mod retry;
pub mod stats;
pub mod tokenizer;
pub mod vector_store;

pub use error::{LoreError, Result};
