//! Genaniml CLI entry point.

use anyhow::Result;
use clap::Parser;
use genaniml::cli::{commands, Cli, Commands};
use genaniml::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("genaniml={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings, config_path.as_deref()).await?;
        }

        Commands::Ask { question, checklist } => {
            commands::run_ask(question, *checklist, settings).await?;
        }

        Commands::Transcribe { input, language, ask, docx } => {
            commands::run_transcribe(input, language.clone(), *ask, docx.clone(), settings).await?;
        }

        Commands::Listen { language, docx } => {
            commands::run_listen(language.clone(), docx.clone(), settings).await?;
        }

        Commands::Ingest(args) => {
            commands::run_ingest(args, settings).await?;
        }

        Commands::Translate { text, src, dest } => {
            commands::run_translate(text, src, dest, settings).await?;
        }

        Commands::Collections { action } => {
            commands::run_collections(action, settings).await?;
        }

        Commands::Chat => {
            commands::run_chat(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
