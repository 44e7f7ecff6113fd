//! Listen command: continuous microphone transcription.

use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the listen command.
#[cfg(feature = "microphone")]
pub async fn run_listen(language: Option<String>, docx: Option<PathBuf>, settings: Settings) -> Result<()> {
    use crate::cli::preflight::{self, Operation};
    use crate::transcription::{
        language_label, save_transcript_docx, ContinuousListener, Microphone, SaveOutcome,
        WhisperRecognizer,
    };
    use std::sync::Arc;
    use std::time::Duration;

    if let Err(e) = preflight::check(Operation::Transcribe, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'genaniml doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if !Microphone::is_available() {
        Output::error("No microphone found.");
        anyhow::bail!("no input device available");
    }

    let language = language.unwrap_or_else(|| settings.transcription.language.clone());
    let microphone = Arc::new(Microphone::new(
        Duration::from_secs(settings.transcription.phrase_time_limit_seconds as u64),
        settings.transcription.sample_rate,
    ));
    let recognizer = Arc::new(WhisperRecognizer::with_model(&settings.transcription.model)?);

    let listener = ContinuousListener::start(recognizer, microphone, language.clone());
    Output::info(&format!(
        "Listening in {}... press Enter to stop.",
        language_label(&language)
    ));

    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| ())
    })
    .await??;

    let spinner = Output::spinner("Finishing the current phrase...");
    let text = listener.stop().await;
    spinner.finish_and_clear();
    let text = text?;

    if text.is_empty() {
        Output::warning("Nothing was recognised.");
    } else {
        Output::header("Transcribed Text");
        println!("{}\n", text);
    }

    if let Some(path) = docx {
        match save_transcript_docx(&path, language_label(&language), &text)? {
            SaveOutcome::Saved => Output::success(&format!("Saved transcript to {}", path.display())),
            SaveOutcome::NothingToSave => Output::warning("No text to save!"),
        }
    }

    Ok(())
}

/// Run the listen command.
#[cfg(not(feature = "microphone"))]
pub async fn run_listen(_language: Option<String>, _docx: Option<PathBuf>, _settings: Settings) -> Result<()> {
    Output::error("This build of genaniml has no microphone support.");
    Output::info("Rebuild with: cargo install genaniml --features microphone");
    Output::info("Or record a WAV file and use 'genaniml transcribe <file>'.");
    anyhow::bail!("microphone support not enabled")
}
