//! CLI module for Lorekeeper.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Lorekeeper - a lore knowledge base built from episode transcripts
///
/// Cleans transcripts, extracts structured lore with a hosted model, indexes
/// it for semantic search and answers questions from it.
#[derive(Parser, Debug)]
#[command(name = "lorekeeper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Correct raw speech-to-text transcripts with the hosted model
    Clean,

    /// Extract structured lore records from cleaned transcripts
    Extract,

    /// Normalize lore records and index their fragments
    Index {
        /// Re-index records that are already in the knowledge base
        #[arg(short, long)]
        force: bool,
    },

    /// Search the knowledge base for relevant fragments
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.3")]
        min_score: f32,
    },

    /// Ask a question and get an answer from the lore
    Ask {
        /// The question to ask
        question: String,

        /// LLM model to use for response generation
        #[arg(short, long)]
        model: Option<String>,

        /// Number of fragments to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Token budget for the assembled context
        #[arg(short, long)]
        budget: Option<usize>,
    },

    /// Start an interactive chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List indexed episodes
    List,

    /// Show token length statistics of indexed fragments
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
