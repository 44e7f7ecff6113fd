//! PDF ingestion: render pages, clean them up, OCR, then translate or chunk.

mod ocr;
mod pdf;
mod preprocess;

pub use ocr::{OcrEngine, TesseractOcr};
pub use pdf::render_pages;
pub use preprocess::{adaptive_threshold_inv, preprocess_page};

use crate::chunking::chunk_text;
use crate::error::{GenanimlError, Result};
use crate::translation::{translate_or_original, Translator};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Text extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum PageContent {
    /// Paragraph chunks of the OCR text.
    Chunks(Vec<String>),
    /// The whole page, translated.
    Translated(String),
}

impl PageContent {
    /// Units to index: the chunks, or the translated page as a single unit.
    pub fn into_units(self) -> Vec<String> {
        match self {
            PageContent::Chunks(chunks) => chunks,
            PageContent::Translated(text) if text.trim().is_empty() => Vec::new(),
            PageContent::Translated(text) => vec![text],
        }
    }
}

/// One processed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOutput {
    /// 1-based page number.
    pub page: u32,
    pub content: PageContent,
}

/// Translation requested during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub source: String,
    pub target: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            source: "auto".to_string(),
            target: "en".to_string(),
        }
    }
}

/// Per-document ingestion options.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Tesseract language code.
    pub ocr_language: String,
    pub translate: Option<TranslateOptions>,
    /// Where page images are written.
    pub output_dir: PathBuf,
}

impl IngestOptions {
    pub fn new(ocr_language: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            ocr_language: ocr_language.into(),
            translate: None,
            output_dir: output_dir.into(),
        }
    }

    pub fn with_translation(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.translate = Some(TranslateOptions {
            source: source.into(),
            target: target.into(),
        });
        self
    }
}

/// Renders, cleans, OCRs and splits documents.
pub struct DocumentPipeline {
    ocr: Arc<dyn OcrEngine>,
    translator: Arc<dyn Translator>,
    dpi: u32,
    max_concurrent_pages: usize,
}

impl DocumentPipeline {
    pub fn new(ocr: Arc<dyn OcrEngine>, translator: Arc<dyn Translator>) -> Self {
        Self {
            ocr,
            translator,
            dpi: 200,
            max_concurrent_pages: 1,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Pages processed at once. Output stays in page order regardless.
    pub fn with_max_concurrent_pages(mut self, n: usize) -> Self {
        self.max_concurrent_pages = n.max(1);
        self
    }

    /// Process every page of a PDF.
    #[instrument(skip(self, options), fields(pdf = %pdf.display()))]
    pub async fn process_pdf(&self, pdf: &Path, options: &IngestOptions) -> Result<Vec<PageOutput>> {
        let render_dir = tempfile::tempdir()?;
        let pages = render_pages(pdf, render_dir.path(), self.dpi).await?;
        self.process_pages(&pages, options).await
    }

    /// Process already-rendered page images; `pages[0]` is page 1.
    pub async fn process_pages(&self, pages: &[PathBuf], options: &IngestOptions) -> Result<Vec<PageOutput>> {
        std::fs::create_dir_all(&options.output_dir)?;
        let work_dir = tempfile::tempdir()?;
        info!("Processing {} pages", pages.len());

        let mut outputs: Vec<PageOutput> = stream::iter(pages.iter().enumerate())
            .map(|(idx, path)| self.process_page(idx as u32 + 1, path, options, work_dir.path()))
            .buffer_unordered(self.max_concurrent_pages)
            .try_collect()
            .await?;

        outputs.sort_by_key(|o| o.page);
        Ok(outputs)
    }

    async fn process_page(
        &self,
        page: u32,
        path: &Path,
        options: &IngestOptions,
        work_dir: &Path,
    ) -> Result<PageOutput> {
        let source = path.to_path_buf();
        let output_dir = options.output_dir.clone();
        let ocr_input = work_dir.join(format!("page_{}_ocr.png", page));
        let ocr_target = ocr_input.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let image = image::open(&source)?;
            image
                .to_rgb8()
                .save(output_dir.join(format!("page_{}_original.jpg", page)))?;

            let processed = preprocess_page(&image);
            processed.save(output_dir.join(format!("page_{}_processed.jpg", page)))?;
            processed.save(&ocr_target)?;
            Ok(())
        })
        .await
        .map_err(|e| GenanimlError::Ingestion(format!("Page {} preprocessing panicked: {}", page, e)))??;

        let text = self.ocr.extract_text(&ocr_input, &options.ocr_language).await?;
        debug!("Page {}: {} characters of OCR text", page, text.len());

        let content = match &options.translate {
            Some(t) => PageContent::Translated(
                translate_or_original(self.translator.as_ref(), &text, &t.source, &t.target).await,
            ),
            None => PageContent::Chunks(chunk_text(&text)),
        };

        Ok(PageOutput { page, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EchoTranslator, FailingTranslator, FakeOcr};
    use image::{GrayImage, Luma};

    fn write_pages(dir: &Path, count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|n| {
                let path = dir.join(format!("page-{}.png", n));
                GrayImage::from_pixel(120, 80, Luma([255])).save(&path).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_pages_chunked_in_order_with_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let pages = write_pages(dir.path(), 3);
        let out_dir = dir.path().join("output_images");

        let ocr = Arc::new(FakeOcr::new());
        let pipeline = DocumentPipeline::new(ocr.clone(), Arc::new(EchoTranslator::default()))
            .with_max_concurrent_pages(3);
        let outputs = pipeline
            .process_pages(&pages, &IngestOptions::new("kan", &out_dir))
            .await
            .unwrap();

        assert_eq!(outputs.iter().map(|o| o.page).collect::<Vec<_>>(), vec![1, 2, 3]);
        match &outputs[1].content {
            PageContent::Chunks(chunks) => {
                assert_eq!(chunks.len(), 2);
                assert!(chunks[0].contains("page_2"));
                assert_eq!(chunks[1], "Second paragraph");
            }
            other => panic!("expected chunks, got {:?}", other),
        }

        for n in 1..=3 {
            assert!(out_dir.join(format!("page_{}_original.jpg", n)).exists());
            assert!(out_dir.join(format!("page_{}_processed.jpg", n)).exists());
        }
        assert!(ocr.languages().iter().all(|l| l == "kan"));
    }

    #[tokio::test]
    async fn test_translation_keeps_page_whole() {
        let dir = tempfile::tempdir().unwrap();
        let pages = write_pages(dir.path(), 1);

        let pipeline = DocumentPipeline::new(Arc::new(FakeOcr::new()), Arc::new(EchoTranslator::default()));
        let options = IngestOptions::new("kan", dir.path().join("out")).with_translation("kn", "en");
        let outputs = pipeline.process_pages(&pages, &options).await.unwrap();

        match &outputs[0].content {
            PageContent::Translated(text) => {
                assert!(text.starts_with("[kn->en] "));
                assert!(text.contains("\n\nSecond paragraph"));
            }
            other => panic!("expected translation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_ocr_text() {
        let dir = tempfile::tempdir().unwrap();
        let pages = write_pages(dir.path(), 1);

        let pipeline = DocumentPipeline::new(Arc::new(FakeOcr::new()), Arc::new(FailingTranslator));
        let options = IngestOptions::new("kan", dir.path().join("out")).with_translation("kn", "en");
        let outputs = pipeline.process_pages(&pages, &options).await.unwrap();

        assert_eq!(
            outputs[0].content,
            PageContent::Translated("Text of page_1_ocr\n\nSecond paragraph\n".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreadable_page_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("page-1.png");
        std::fs::write(&bogus, b"not an image").unwrap();

        let pipeline = DocumentPipeline::new(Arc::new(FakeOcr::new()), Arc::new(FailingTranslator));
        let result = pipeline
            .process_pages(&[bogus], &IngestOptions::new("eng", dir.path().join("out")))
            .await;
        assert!(matches!(result, Err(GenanimlError::Image(_))));
    }

    #[test]
    fn test_into_units() {
        assert_eq!(
            PageContent::Chunks(vec!["a".into(), "b".into()]).into_units(),
            vec!["a", "b"]
        );
        assert_eq!(PageContent::Translated("whole page".into()).into_units(), vec!["whole page"]);
        assert!(PageContent::Translated("  ".into()).into_units().is_empty());
    }
}
