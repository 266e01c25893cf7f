//! Lorekeeper CLI entry point.

use anyhow::Result;
use clap::Parser;
use lorekeeper::cli::{commands, Cli, Commands};
use lorekeeper::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("lorekeeper={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Commands::Config { action } = &cli.command {
        return commands::run_config(action, config_path, settings);
    }

    let settings = settings.with_env_api_key();
    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Clean => {
            commands::run_clean(settings).await?;
        }

        Commands::Extract => {
            commands::run_extract(settings).await?;
        }

        Commands::Index { force } => {
            commands::run_index(*force, settings).await?;
        }

        Commands::Search {
            query,
            limit,
            min_score,
        } => {
            commands::run_search(query, *limit, *min_score, settings).await?;
        }

        Commands::Ask {
            question,
            model,
            top_k,
            budget,
        } => {
            commands::run_ask(question, model.clone(), *top_k, *budget, settings).await?;
        }

        Commands::Chat { model } => {
            commands::run_chat(model.clone(), settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Stats => {
            commands::run_stats(settings).await?;
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}
