//! Collections command implementation.

use crate::cli::{CollectionsAction, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the collections command.
pub async fn run_collections(action: &CollectionsAction, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let kb = orchestrator.knowledge_base();

    match action {
        CollectionsAction::List => {
            let collections = kb.list_collections().await?;

            if collections.is_empty() {
                Output::info("No collections yet.");
                Output::info("Add one with: genaniml ingest <file.pdf> --state <state>");
                return Ok(());
            }

            Output::header(&format!("Collections ({})", collections.len()));
            println!();
            for c in &collections {
                println!(
                    "  {} {} ({} chunks, {}, created {})",
                    style("*").cyan(),
                    style(&c.name).bold(),
                    c.document_count,
                    c.distance,
                    c.created_at.format("%Y-%m-%d")
                );
            }
            println!();
        }

        CollectionsAction::Delete { name, yes } => {
            if !yes && !confirm(&format!("Delete '{}' and all its chunks? This cannot be undone.", name))? {
                Output::info("Cancelled.");
                return Ok(());
            }

            match kb.delete_collection(name).await {
                Ok(()) => Output::success(&format!("Deleted {}", name)),
                Err(e) => {
                    Output::error(&format!("{}", e));
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} {} [y/N] ", style("?").yellow().bold(), prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
