//! Speech-to-text.
//!
//! Recognition never raises past this module: every call yields a
//! [`TranscriptionResult`] whose error side says *why* nothing was recognised.
//!
//! - [`recognize_clip`] / [`recognize_wav`]: single shot from an in-memory buffer.
//! - [`ContinuousListener`]: background listening until stopped.
//! - [`save_transcript_docx`]: write the accumulated text to a Word document.

mod audio;
mod document;
mod listener;
#[cfg(feature = "microphone")]
mod microphone;
mod whisper;

pub use audio::AudioClip;
pub use document::{language_label, save_transcript_docx, SaveOutcome};
pub use listener::ContinuousListener;
#[cfg(feature = "microphone")]
pub use microphone::Microphone;
pub use whisper::WhisperRecognizer;

use crate::error::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Why a recognition attempt produced no text.
///
/// The display strings are what the UI shows in place of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptionError {
    #[error("[Error: Unable to reach the speech recognition service]")]
    ServiceUnreachable,

    #[error("[Error: Could not understand audio]")]
    Unintelligible,

    #[error("[Error: {0}]")]
    Failed(String),
}

/// Outcome of a single recognition attempt.
pub type TranscriptionResult = std::result::Result<String, TranscriptionError>;

/// Trait for speech recognition services.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognise speech in `clip`. `language` is a BCP-47 tag such as `en-US` or `kn-IN`.
    async fn recognize(&self, clip: &AudioClip, language: &str) -> TranscriptionResult;
}

/// Blocking source of spoken phrases (e.g. a microphone).
pub trait AudioCapture: Send + Sync {
    /// Block until one phrase has been captured.
    fn capture_phrase(&self) -> Result<AudioClip>;
}

/// Recognise a single clip.
pub async fn recognize_clip(
    recognizer: &dyn SpeechRecognizer,
    clip: &AudioClip,
    language: &str,
) -> TranscriptionResult {
    recognizer.recognize(clip, language).await
}

/// Decode a WAV buffer and recognise it.
pub async fn recognize_wav(
    recognizer: &dyn SpeechRecognizer,
    bytes: &[u8],
    language: &str,
) -> TranscriptionResult {
    let clip = AudioClip::from_wav(bytes).map_err(|e| TranscriptionError::Failed(e.to_string()))?;
    recognizer.recognize(&clip, language).await
}

/// Reduce a BCP-47 tag to its primary language subtag (`kn-IN` -> `kn`).
pub fn primary_language(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or(tag)
        .trim()
        .to_lowercase()
}
