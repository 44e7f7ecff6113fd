//! Google Translate web endpoint.

use super::Translator;
use crate::error::{GenanimlError, Result};
use crate::openai::http_client;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

/// Default endpoint of the public translate service.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Client for the public Google Translate endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.to_string(),
        })
    }

    fn request_url(&self, text: &str, source: &str, target: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| GenanimlError::Config(format!("Invalid translation endpoint: {}", e)))
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The body looks like `[[["translated", "original", ...], ...], ...]`.
fn parse_segments(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| GenanimlError::Translation("Unexpected response shape".to_string()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[async_trait]
impl Translator for GoogleTranslator {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = self.request_url(text, source, target)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(GenanimlError::Translation(format!(
                "Translate service returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let translated = parse_segments(&body)?;
        debug!("Translated {} -> {} ({} chars)", source, target, translated.len());
        Ok(translated)
    }
}
