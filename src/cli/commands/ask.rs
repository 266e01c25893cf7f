//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::RagAnswer;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    top_k: Option<usize>,
    budget: Option<usize>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let mut engine = orchestrator.rag_engine(model.as_deref())?;
    if let Some(top_k) = top_k {
        engine = engine.with_top_k(top_k);
    }
    if let Some(budget) = budget {
        engine = engine.with_token_budget(budget)?;
    }

    let spinner = Output::spinner("Searching the lore...");

    match engine.answer(question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            print_answer(&response);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Print an answer followed by the fragments that made it into the context.
pub(super) fn print_answer(response: &RagAnswer) {
    println!("\n{}\n", response.answer);

    let used = &response.sources[..response.context.chunks_included];
    if !used.is_empty() {
        Output::header("Sources");
        for source in used {
            Output::fragment(source.title(), source.kind(), source.score, &source.text);
        }
        println!();
        Output::kv(
            "Context",
            &format!(
                "{}/{} tokens{}",
                response.context.used_tokens,
                response.context.budget,
                if response.context.truncated { ", truncated" } else { "" }
            ),
        );
    }
}
