//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{IngestArgs, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(args: &IngestArgs, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'genaniml doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let mut options = orchestrator.ingest_options(&args.lang);
    if let Some(dir) = &args.output_dir {
        options.output_dir = dir.clone();
    }
    if args.translate {
        options = options.with_translation(&args.src, &args.dest);
    }

    Output::header("Ingesting document");
    Output::kv("File", &args.pdf.display().to_string());
    Output::kv("State", &args.state);
    Output::kv("OCR language", &args.lang);
    if let Some(t) = &options.translate {
        Output::kv("Translation", &format!("{} -> {}", t.source, t.target));
    }
    println!();

    let spinner = Output::spinner("Rendering, cleaning and reading pages...");
    let result = orchestrator.ingest_pdf(&args.pdf, &args.state, &options).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} chunks from {} pages into {}",
                report.chunks_indexed, report.pages, report.collection
            ));
            Output::kv("Page images", &report.output_dir.display().to_string());
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
