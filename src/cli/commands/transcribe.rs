//! Transcribe command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcription::{language_label, save_transcript_docx, AudioClip, SaveOutcome};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Run the transcribe command.
pub async fn run_transcribe(
    input: &Path,
    language: Option<String>,
    ask: bool,
    docx: Option<PathBuf>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcribe, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'genaniml doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let language = language.unwrap_or_else(|| settings.transcription.language.clone());
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let clip = AudioClip::from_wav(&bytes)?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!(
        "Transcribing {:.1}s of {} speech...",
        clip.duration_seconds(),
        language_label(&language)
    ));

    let (transcript, voice) = if ask {
        let voice = orchestrator.respond_to_audio(&clip, &language).await;
        spinner.finish_and_clear();
        let voice = voice?;
        (voice.transcript.clone(), Some(voice))
    } else {
        let transcript = orchestrator.recognizer().recognize(&clip, &language).await;
        spinner.finish_and_clear();
        (transcript, None)
    };

    let text = match transcript {
        Ok(text) => text,
        Err(e) => {
            Output::error(&e.to_string());
            return Ok(());
        }
    };

    Output::header("Transcribed Text");
    println!("{}\n", text);

    if let Some(voice) = voice {
        if let Some(query) = voice.query.as_deref().filter(|q| *q != text) {
            Output::kv("Asked as", query);
        }
        if let Some(response) = &voice.response {
            Output::response(response);
        }
    }

    if let Some(path) = docx {
        match save_transcript_docx(&path, language_label(&language), &text)? {
            SaveOutcome::Saved => Output::success(&format!("Saved transcript to {}", path.display())),
            SaveOutcome::NothingToSave => Output::warning("No text to save!"),
        }
    }

    Ok(())
}
