//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::TaskChecklist;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, checklist: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'genaniml doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching knowledge base...");

    match orchestrator.respond_to_text(question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            Output::response(&response);

            if checklist && response.found {
                Output::checklist(&TaskChecklist::new());
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
