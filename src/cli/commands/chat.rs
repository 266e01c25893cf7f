//! Interactive chat command.
//!
//! Every turn is an independent question: the knowledge base is searched
//! again and no conversation history is sent to the model.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::format_sources;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Words that end the session, compared case-insensitively.
const EXIT_WORDS: [&str; 4] = ["exit", "quit", "wyjscie", "koniec"];

fn is_exit_word(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let engine = orchestrator.rag_engine(model.as_deref())?;

    println!("\n{}", style("Lorekeeper Chat").bold().cyan());
    println!(
        "{}\n",
        style(format!("Ask about the lore, or type one of: {}", EXIT_WORDS.join(", "))).dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if is_exit_word(input) {
            Output::info("Goodbye!");
            break;
        }

        let spinner = Output::spinner("Searching the lore...");
        let result = engine.answer(input).await;
        spinner.finish_and_clear();

        match result {
            Ok(response) => {
                println!("\n{} {}\n", style("Lorekeeper:").cyan().bold(), response.answer);
                let used = &response.sources[..response.context.chunks_included];
                if !used.is_empty() {
                    println!("{}\n", style(format_sources(used)).dim());
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit_word("exit"));
        assert!(is_exit_word("QUIT"));
        assert!(is_exit_word("Koniec"));
        assert!(is_exit_word("wyjscie"));
        assert!(!is_exit_word("exit please"));
        assert!(!is_exit_word("Who is Torpeda?"));
    }
}
