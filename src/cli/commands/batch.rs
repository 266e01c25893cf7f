//! Clean and extract command implementations.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{BatchReport, Orchestrator};
use anyhow::Result;

/// Run the clean command.
pub async fn run_clean(settings: Settings) -> Result<()> {
    preflight_or_report(&settings)?;

    let orchestrator = Orchestrator::new(settings)?;
    let paths = &orchestrator.settings().paths;
    Output::info(&format!(
        "Cleaning transcripts from {} into {}",
        paths.transcripts_dir, paths.clean_dir
    ));

    let report = orchestrator.clean_transcripts().await?;
    print_report("Cleaned", &report, orchestrator.settings());
    Ok(())
}

/// Run the extract command.
pub async fn run_extract(settings: Settings) -> Result<()> {
    preflight_or_report(&settings)?;

    let orchestrator = Orchestrator::new(settings)?;
    let paths = &orchestrator.settings().paths;
    Output::info(&format!(
        "Extracting lore from {} into {}",
        paths.clean_dir, paths.lore_dir
    ));

    let report = orchestrator.extract_lore().await?;
    print_report("Extracted", &report, orchestrator.settings());
    Ok(())
}

fn preflight_or_report(settings: &Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Batch, settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

fn print_report(verb: &str, report: &BatchReport, settings: &Settings) {
    Output::success(&format!("{} {} files", verb, report.processed));
    if report.skipped_existing > 0 {
        Output::kv("Already done", &report.skipped_existing.to_string());
    }
    if !report.failed.is_empty() {
        Output::warning(&format!(
            "{} files failed (logged to {})",
            report.failed.len(),
            settings.paths.failed_log
        ));
        for name in &report.failed {
            Output::list_item(name);
        }
    }
}
