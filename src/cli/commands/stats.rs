//! Stats command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the stats command.
pub async fn run_stats(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Stats, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let Some(stats) = orchestrator.fragment_stats().await? else {
        Output::info("The knowledge base is empty.");
        return Ok(());
    };

    Output::header("Fragment Lengths (tokens)");
    Output::kv("Fragments", &stats.count.to_string());
    Output::kv("Mean", &format!("{:.1}", stats.mean));
    Output::kv("Min", &stats.min.to_string());
    Output::kv("Max", &stats.max.to_string());
    for (limit, count) in &stats.over {
        Output::kv(&format!("Over {}", limit), &count.to_string());
    }

    Ok(())
}
