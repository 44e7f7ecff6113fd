//! Deterministic stand-ins for the network- and device-backed traits.

use crate::embedding::Embedder;
use crate::error::{GenanimlError, Result};
use crate::ingest::OcrEngine;
use crate::llm::{ChatMessage, ChatModel};
use crate::transcription::{AudioCapture, AudioClip, SpeechRecognizer, TranscriptionError, TranscriptionResult};
use crate::translation::Translator;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const KEYWORDS: [&str; 4] = ["elephant", "crop", "snake", "leopard"];

/// Bag-of-keywords embedder. Every vector carries a small constant so no
/// vector is all zeros.
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = KEYWORDS
            .iter()
            .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
            .collect();
        v.push(0.1);
        v
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        KEYWORDS.len() + 1
    }
}

/// Chat model replying from a script and recording what it was sent.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChat {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GenanimlError::Llm("script exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Recogniser returning scripted results, then `Unintelligible`.
pub struct FakeRecognizer {
    results: Mutex<VecDeque<TranscriptionResult>>,
    languages: Mutex<Vec<String>>,
}

impl FakeRecognizer {
    pub fn new(results: Vec<TranscriptionResult>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            languages: Mutex::new(Vec::new()),
        }
    }

    /// Language passed to each call, in order.
    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn recognize(&self, _clip: &AudioClip, language: &str) -> TranscriptionResult {
        self.languages.lock().unwrap().push(language.to_string());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TranscriptionError::Unintelligible))
    }
}

/// Capture yielding short silent clips, or always failing.
pub struct FakeCapture {
    fail: bool,
}

impl FakeCapture {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl AudioCapture for FakeCapture {
    fn capture_phrase(&self) -> Result<AudioClip> {
        std::thread::sleep(Duration::from_millis(2));
        if self.fail {
            return Err(GenanimlError::Audio("no input device".to_string()));
        }
        Ok(AudioClip::new(vec![0; 160], 16_000, 1))
    }
}

/// Translator that tags text with the language pair.
#[derive(Default)]
pub struct EchoTranslator {
    calls: AtomicUsize,
}

impl EchoTranslator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{}->{}] {}", source, target, text))
    }
}

/// Translator whose service is always down.
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
        Err(GenanimlError::Translation("service unavailable".to_string()))
    }
}

/// OCR returning two paragraphs named after the image file.
pub struct FakeOcr {
    languages: Mutex<Vec<String>>,
}

impl FakeOcr {
    pub fn new() -> Self {
        Self {
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn extract_text(&self, image: &Path, language: &str) -> Result<String> {
        self.languages.lock().unwrap().push(language.to_string());
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("Text of {}\n\nSecond paragraph\n", stem))
    }
}
