//! HTTP client construction with sensible defaults.
//!
//! Every outbound client (OpenAI, Ollama, translation) shares the same request
//! timeout so a dead service cannot block a command forever.

use crate::error::{GenanimlError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for outbound API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Build a plain reqwest client with the default timeout.
pub fn http_client() -> Result<reqwest::Client> {
    http_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Build a plain reqwest client with a custom timeout.
pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenanimlError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Create an OpenAI client with the default timeout.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_builds() {
        tokio_test::assert_ok!(http_client_with_timeout(Duration::from_secs(1)));
    }
}
