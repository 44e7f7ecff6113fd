//! Genaniml - a human-wildlife conflict assistant for India
//!
//! Answers questions about conflicts between people and wild animals from
//! per-state knowledge bases built out of scanned government documents.
//!
//! # Overview
//!
//! Genaniml allows you to:
//! - OCR scanned PDFs (English or Kannada) into a state's knowledge base
//! - Ask typed or spoken questions and get answers grounded in that state's documents
//! - Transcribe speech, translate it, and save transcripts as Word documents
//! - Track follow-up actions with a per-session checklist
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `transcription` - Speech-to-text and continuous listening
//! - `translation` - Text translation
//! - `ingest` - PDF rendering, page cleanup and OCR
//! - `chunking` - Page text to indexable chunks
//! - `embedding` - Embedding generation
//! - `vector_store` - Named collections of embedded chunks
//! - `llm` - Local chat model client and the wildlife assistant
//! - `rag` - State routing, retrieval and answering
//! - `session` - Per-conversation state and the suggested-actions checklist
//! - `orchestrator` - Wires everything together
//!
//! # Example
//!
//! ```rust,no_run
//! use genaniml::config::Settings;
//! use genaniml::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let response = orchestrator
//!         .respond_to_text("An elephant destroyed my crops near Mysore. What should I do?")
//!         .await?;
//!     println!("[{}] {}", response.state, response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod transcription;
pub mod translation;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{GenanimlError, Result};
