//! Index command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the index command.
pub async fn run_index(force: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Index, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    Output::info(&format!(
        "Indexing lore records from {}",
        orchestrator.settings().lore_dir().display()
    ));

    let report = orchestrator.index_lore(force).await?;

    Output::success(&format!(
        "Indexed {} fragments from {} records",
        report.fragments_indexed,
        report.records_indexed
    ));
    if report.already_indexed > 0 {
        Output::kv(
            "Already indexed",
            &format!("{} (use --force to re-index)", report.already_indexed),
        );
    }
    if !report.skipped_records.is_empty() {
        Output::warning(&format!(
            "Skipped {} malformed records",
            report.skipped_records.len()
        ));
        for skipped in &report.skipped_records {
            Output::list_item(&format!("{}: {}", skipped.source_file, skipped.reason));
        }
    }

    Ok(())
}
