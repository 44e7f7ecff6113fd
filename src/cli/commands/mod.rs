//! CLI command implementations.

mod ask;
mod chat;
mod collections;
mod config;
mod doctor;
mod ingest;
mod listen;
mod serve;
mod transcribe;
mod translate;

pub use ask::run_ask;
pub use chat::run_chat;
pub use collections::run_collections;
pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use listen::run_listen;
pub use serve::run_serve;
pub use transcribe::run_transcribe;
pub use translate::run_translate;
