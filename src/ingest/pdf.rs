//! PDF rasterisation with poppler's `pdftoppm`.

use crate::error::{GenanimlError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};

const PAGE_PREFIX: &str = "page";

/// Render every page of `pdf` to PNG files in `out_dir`, in page order.
#[instrument(skip(out_dir), fields(pdf = %pdf.display()))]
pub async fn render_pages(pdf: &Path, out_dir: &Path, dpi: u32) -> Result<Vec<PathBuf>> {
    if !pdf.exists() {
        return Err(GenanimlError::InvalidInput(format!(
            "PDF not found: {}",
            pdf.display()
        )));
    }
    std::fs::create_dir_all(out_dir)?;

    let result = Command::new("pdftoppm")
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-png")
        .arg(pdf)
        .arg(out_dir.join(PAGE_PREFIX))
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => {}
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            return Err(GenanimlError::Ingestion(format!("pdftoppm failed: {err}")));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(GenanimlError::ToolNotFound("pdftoppm".into()));
        }
        Err(e) => {
            return Err(GenanimlError::Ingestion(format!("pdftoppm execution failed: {e}")));
        }
    }

    let pages = rendered_pages(out_dir)?;
    if pages.is_empty() {
        return Err(GenanimlError::Ingestion(format!(
            "No pages rendered from {}",
            pdf.display()
        )));
    }

    info!("Rendered {} pages at {} dpi", pages.len(), dpi);
    Ok(pages)
}

/// Collect `page-<n>.png` files sorted by page number.
///
/// pdftoppm zero-pads the number to the width of the page count, so names are
/// sorted numerically rather than lexically.
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let number = page_number(&path)?;
            Some((number, path))
        })
        .collect();

    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?.parse().ok()
}
