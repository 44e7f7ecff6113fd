//! Translate command implementation.

use crate::config::Settings;
use crate::translation::{translate_or_original, GoogleTranslator};
use anyhow::Result;

/// Run the translate command. A failed translation prints the input unchanged.
pub async fn run_translate(text: &str, src: &str, dest: &str, settings: Settings) -> Result<()> {
    let translator = GoogleTranslator::with_endpoint(&settings.translation.endpoint)?;
    let translated = translate_or_original(&translator, text, src, dest).await;
    println!("{}", translated);
    Ok(())
}
