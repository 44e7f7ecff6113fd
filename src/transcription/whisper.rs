//! Hosted speech recognition through the OpenAI transcription API.

use super::{primary_language, AudioClip, SpeechRecognizer, TranscriptionError, TranscriptionResult};
use crate::error::Result;
use crate::openai::create_client;
use async_openai::error::OpenAIError;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Whisper-based speech recogniser.
pub struct WhisperRecognizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperRecognizer {
    /// Create a recogniser with the default model.
    pub fn new() -> Result<Self> {
        Self::with_model("whisper-1")
    }

    /// Create a recogniser for a specific transcription model.
    pub fn with_model(model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
        })
    }

    async fn transcribe(&self, clip: &AudioClip, language: &str) -> TranscriptionResult {
        let wav = clip
            .to_wav()
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8("speech.wav".to_string(), wav))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        let lang = primary_language(language);
        if !lang.is_empty() {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| TranscriptionError::Failed(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(classify)?;

        non_empty(&response.text)
    }
}

/// Map an API error onto the recognition outcome it represents.
fn classify(err: OpenAIError) -> TranscriptionError {
    match err {
        OpenAIError::Reqwest(e) if e.is_connect() || e.is_timeout() => {
            TranscriptionError::ServiceUnreachable
        }
        other => TranscriptionError::Failed(other.to_string()),
    }
}

fn non_empty(text: &str) -> TranscriptionResult {
    let text = text.trim();
    if text.is_empty() {
        Err(TranscriptionError::Unintelligible)
    } else {
        Ok(text.to_string())
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    #[instrument(skip(self, clip), fields(model = %self.model, seconds = clip.duration_seconds()))]
    async fn recognize(&self, clip: &AudioClip, language: &str) -> TranscriptionResult {
        if clip.is_empty() {
            return Err(TranscriptionError::Unintelligible);
        }

        let result = self.transcribe(clip, language).await;
        match &result {
            Ok(text) => debug!("Recognised {} characters", text.len()),
            Err(e) => warn!("Recognition failed: {}", e),
        }
        result
    }
}
