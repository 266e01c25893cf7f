//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::RetrievedChunk;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: usize, min_score: f32, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching...");

    let results = async {
        let embedding = orchestrator.embedder().embed(query).await?;
        orchestrator
            .vector_store()
            .search_with_threshold(&embedding, limit, min_score)
            .await
    }
    .await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            let chunks = RetrievedChunk::from_results(results);
            if chunks.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", chunks.len()));

                for chunk in &chunks {
                    Output::fragment(chunk.title(), chunk.kind(), chunk.score, &chunk.text);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
