//! CLI module for genaniml.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// GenAnIML - Wildlife Conflict Resolution Assistant
///
/// Ask about human-wildlife conflicts in India by text or voice and get answers
/// grounded in each state's compensation rules and guidelines.
#[derive(Parser, Debug)]
#[command(name = "genaniml")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Ask a question about a wildlife conflict
    Ask {
        /// The question to ask
        question: String,

        /// Show the suggested actions after the answer
        #[arg(long)]
        checklist: bool,
    },

    /// Transcribe a WAV recording, optionally answering it
    Transcribe {
        /// Path to a WAV file
        input: PathBuf,

        /// Spoken language (e.g. en-US, kn-IN); defaults to the configured language
        #[arg(short, long)]
        language: Option<String>,

        /// Ask the assistant the transcribed question
        #[arg(long)]
        ask: bool,

        /// Save the transcript to a Word document
        #[arg(long)]
        docx: Option<PathBuf>,
    },

    /// Listen on the microphone until Enter is pressed
    Listen {
        /// Spoken language (e.g. en-US, kn-IN); defaults to the configured language
        #[arg(short, long)]
        language: Option<String>,

        /// Save the transcript to a Word document
        #[arg(long)]
        docx: Option<PathBuf>,
    },

    /// OCR a PDF and add it to a state's knowledge base
    Ingest(IngestArgs),

    /// Translate text between languages
    Translate {
        /// Text to translate
        text: String,

        /// Source language code
        #[arg(long, default_value = "auto")]
        src: String,

        /// Target language code
        #[arg(long, default_value = "en")]
        dest: String,
    },

    /// Manage knowledge base collections
    Collections {
        #[command(subcommand)]
        action: CollectionsAction,
    },

    /// Start an interactive session with the suggested-actions checklist
    Chat,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path to the PDF
    pub pdf: PathBuf,

    /// State whose knowledge base receives the text (e.g. karnataka)
    #[arg(short, long)]
    pub state: String,

    /// Tesseract language code of the document (eng, kan, tel, mal, ...)
    #[arg(short, long, default_value = "eng")]
    pub lang: String,

    /// Translate each page instead of splitting it into paragraphs
    #[arg(long)]
    pub translate: bool,

    /// Source language for translation
    #[arg(long, default_value = "auto")]
    pub src: String,

    /// Target language for translation
    #[arg(long, default_value = "en")]
    pub dest: String,

    /// Directory for page images (defaults to the configured OCR output directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CollectionsAction {
    /// List collections and their chunk counts
    List,

    /// Delete a collection and everything in it
    Delete {
        /// Collection name (e.g. karnataka_knowledge_base)
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
