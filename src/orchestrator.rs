//! Top-level wiring for genaniml.
//!
//! Builds every collaborator from configuration and exposes the three things
//! the front ends do: answer text, answer speech, and index a document.

use crate::chunking::page_chunks;
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{GenanimlError, Result};
use crate::ingest::{DocumentPipeline, IngestOptions, OcrEngine, PageOutput, TesseractOcr};
use crate::llm::{ChatModel, OllamaChat, WildlifeAssistant};
use crate::rag::{collection_name, AssistantResponse, ResponseOrchestrator};
use crate::transcription::{
    primary_language, AudioClip, SpeechRecognizer, TranscriptionResult, WhisperRecognizer,
};
use crate::translation::{translate_or_original, GoogleTranslator, Translator};
use crate::vector_store::{create_vector_store, KnowledgeBase, VectorStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Swappable collaborators, for tests and embedding.
pub struct Components {
    pub chat: Arc<dyn ChatModel>,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub translator: Arc<dyn Translator>,
    pub ocr: Arc<dyn OcrEngine>,
}

/// Outcome of a spoken question.
#[derive(Debug, Clone)]
pub struct VoiceResponse {
    /// What was recognised, or why nothing was.
    pub transcript: TranscriptionResult,
    /// The text actually asked (translated to English for Kannada speech).
    pub query: Option<String>,
    /// Present only when recognition succeeded.
    pub response: Option<AssistantResponse>,
}

/// Summary of an indexed document.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub collection: String,
    pub source: String,
    pub pages: usize,
    pub chunks_indexed: usize,
    /// Where the page images were written.
    pub output_dir: PathBuf,
}

/// The main orchestrator for genaniml.
pub struct Orchestrator {
    settings: Settings,
    knowledge_base: KnowledgeBase,
    responder: ResponseOrchestrator,
    recognizer: Arc<dyn SpeechRecognizer>,
    translator: Arc<dyn Translator>,
    pipeline: DocumentPipeline,
}

impl Orchestrator {
    /// Create an orchestrator from configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        info!("Using {} at {}", settings.llm.model, settings.llm.base_url);
        let chat = Arc::new(OllamaChat::new(&settings.llm.base_url, &settings.llm.model)?);
        let embedder = create_embedder(&settings.embedding)?;
        let store = create_vector_store(&settings)?;
        let recognizer = Arc::new(WhisperRecognizer::with_model(&settings.transcription.model)?);
        let translator = Arc::new(GoogleTranslator::with_endpoint(&settings.translation.endpoint)?);

        let tessdata = settings.ocr.tessdata_prefix.trim();
        let ocr = Arc::new(TesseractOcr::new(
            (!tessdata.is_empty()).then(|| Settings::expand_path(tessdata)),
        ));

        Ok(Self::with_components(
            settings,
            prompts,
            Components {
                chat,
                embedder,
                store,
                recognizer,
                translator,
                ocr,
            },
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(settings: Settings, prompts: Prompts, components: Components) -> Self {
        let knowledge_base = KnowledgeBase::new(components.store, components.embedder);
        let assistant = WildlifeAssistant::new(components.chat).with_prompts(prompts);
        let responder =
            ResponseOrchestrator::new(assistant, knowledge_base.clone(), &settings.assistant);
        let pipeline = DocumentPipeline::new(components.ocr, components.translator.clone())
            .with_dpi(settings.ocr.dpi)
            .with_max_concurrent_pages(settings.ingest.max_concurrent_pages);

        Self {
            settings,
            knowledge_base,
            responder,
            recognizer: components.recognizer,
            translator: components.translator,
            pipeline,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn translator(&self) -> Arc<dyn Translator> {
        self.translator.clone()
    }

    pub fn recognizer(&self) -> Arc<dyn SpeechRecognizer> {
        self.recognizer.clone()
    }

    /// Answer a typed question.
    pub async fn respond_to_text(&self, query: &str) -> Result<AssistantResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GenanimlError::InvalidInput(
                "Please enter some text before submitting.".to_string(),
            ));
        }
        self.responder.get_response(query).await
    }

    /// Recognise a spoken question and answer it.
    ///
    /// A recognition failure is not an error: it is returned in the transcript
    /// with no response. Kannada speech is translated to English before asking.
    #[instrument(skip(self, clip))]
    pub async fn respond_to_audio(&self, clip: &AudioClip, language: &str) -> Result<VoiceResponse> {
        let transcript = self.recognizer.recognize(clip, language).await;

        let text = match &transcript {
            Ok(text) => text.clone(),
            Err(_) => {
                return Ok(VoiceResponse {
                    transcript,
                    query: None,
                    response: None,
                })
            }
        };

        let query = if primary_language(language) == "kn" {
            translate_or_original(self.translator.as_ref(), &text, "kn", "en").await
        } else {
            text
        };

        let response = self.respond_to_text(&query).await?;
        Ok(VoiceResponse {
            transcript,
            query: Some(query),
            response: Some(response),
        })
    }

    /// Ingestion options with the configured page-image directory.
    pub fn ingest_options(&self, ocr_language: &str) -> IngestOptions {
        IngestOptions::new(ocr_language, self.settings.ocr_output_dir())
    }

    /// OCR a PDF and add its text to `state`'s knowledge base.
    #[instrument(skip(self, options), fields(pdf = %pdf.display()))]
    pub async fn ingest_pdf(&self, pdf: &Path, state: &str, options: &IngestOptions) -> Result<IngestReport> {
        let source = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| pdf.display().to_string());

        let pages = self.pipeline.process_pdf(pdf, options).await?;
        let mut report = self.index_pages(state, &source, pages).await?;
        report.output_dir = options.output_dir.clone();
        Ok(report)
    }

    /// Add processed pages to `state`'s knowledge base.
    pub async fn index_pages(&self, state: &str, source: &str, pages: Vec<PageOutput>) -> Result<IngestReport> {
        let state = state.trim().to_lowercase();
        if state.is_empty() {
            return Err(GenanimlError::InvalidInput("A state name is required".to_string()));
        }

        let name = collection_name(&state);
        let collection = self.knowledge_base.create_or_open(&name).await?;

        let page_count = pages.len();
        let mut chunks_indexed = 0;
        for output in pages {
            let units = output.content.into_units();
            let chunks = page_chunks(&units, output.page, source);
            chunks_indexed += collection.add_documents(&chunks).await?.len();
        }

        info!("Indexed {} chunks from {} pages into {}", chunks_indexed, page_count, name);

        Ok(IngestReport {
            collection: name,
            source: source.to_string(),
            pages: page_count,
            chunks_indexed,
            output_dir: self.settings.ocr_output_dir(),
        })
    }
}
