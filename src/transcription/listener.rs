//! Continuous listening in the background.

use super::{AudioCapture, SpeechRecognizer};
use crate::error::{GenanimlError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handle on a running background listener.
///
/// The task captures one phrase at a time, recognises it, and appends any text
/// to an accumulator it owns. [`ContinuousListener::stop`] raises the stop flag,
/// waits for the task and hands the accumulated text back.
pub struct ContinuousListener {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<String>,
}

impl ContinuousListener {
    /// Start listening. Must be called from within a tokio runtime.
    pub fn start(
        recognizer: Arc<dyn SpeechRecognizer>,
        capture: Arc<dyn AudioCapture>,
        language: impl Into<String>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let language = language.into();
        info!("Listening in {}", language);

        let handle = tokio::spawn(listen_loop(recognizer, capture, language, stop.clone()));
        Self { stop, handle }
    }

    /// Whether the background task is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop listening and return the accumulated transcript, trimmed.
    ///
    /// A phrase being captured when the flag is raised is still recognised.
    pub async fn stop(self) -> Result<String> {
        self.stop.store(true, Ordering::SeqCst);
        let text = self
            .handle
            .await
            .map_err(|e| GenanimlError::Audio(format!("Listener task failed: {}", e)))?;
        Ok(text.trim().to_string())
    }
}

async fn listen_loop(
    recognizer: Arc<dyn SpeechRecognizer>,
    capture: Arc<dyn AudioCapture>,
    language: String,
    stop: Arc<AtomicBool>,
) -> String {
    let mut transcript = String::new();

    while !stop.load(Ordering::SeqCst) {
        let source = capture.clone();
        let clip = match tokio::task::spawn_blocking(move || source.capture_phrase()).await {
            Ok(Ok(clip)) => clip,
            Ok(Err(e)) => {
                debug!("Capture failed: {}", e);
                continue;
            }
            Err(e) => {
                debug!("Capture task failed: {}", e);
                continue;
            }
        };

        match recognizer.recognize(&clip, &language).await {
            Ok(text) => {
                transcript.push_str(&text);
                transcript.push(' ');
            }
            Err(e) => debug!("Skipping phrase: {}", e),
        }
    }

    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCapture, FakeRecognizer};
    use crate::transcription::TranscriptionError;
    use std::time::Duration;

    async fn wait_for_calls(recognizer: &FakeRecognizer, n: usize) {
        for _ in 0..500 {
            if recognizer.languages().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("recognizer was called fewer than {} times", n);
    }

    #[tokio::test]
    async fn test_accumulates_recognised_phrases() {
        let recognizer = Arc::new(FakeRecognizer::new(vec![
            Ok("elephants".to_string()),
            Err(TranscriptionError::Unintelligible),
            Ok("near the village".to_string()),
        ]));
        let listener = ContinuousListener::start(
            recognizer.clone(),
            Arc::new(FakeCapture::new()),
            "en-US",
        );
        assert!(listener.is_running());

        wait_for_calls(&recognizer, 3).await;
        let text = listener.stop().await.unwrap();
        assert_eq!(text, "elephants near the village");
        assert!(recognizer.languages().iter().all(|l| l == "en-US"));
    }

    #[tokio::test]
    async fn test_capture_failures_are_skipped() {
        let recognizer = Arc::new(FakeRecognizer::new(vec![Ok("never".to_string())]));
        let listener = ContinuousListener::start(
            recognizer.clone(),
            Arc::new(FakeCapture::failing()),
            "kn-IN",
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        let text = listener.stop().await.unwrap();
        assert!(text.is_empty());
        assert!(recognizer.languages().is_empty());
    }
}
