//! Text recognition over rendered pages.
//!
//! [`TesseractOcr`] drives the `tesseract` command-line tool: each page is
//! PNG-encoded and piped to `tesseract stdin stdout`, so no intermediate
//! image files are written. PNG is lossless, which keeps glyph edges crisp
//! for the recogniser.

use crate::error::ExtractError;
use crate::pipeline::normalize::clean_text;
use crate::pipeline::render::{PageImage, Rasterizer};
use async_trait::async_trait;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Recognises the text on a single page image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// `page` is 1-based and only used for diagnostics.
    async fn recognize(&self, page: usize, image: &PageImage) -> Result<String, ExtractError>;
}

/// OCR engine backed by the tesseract CLI.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: PathBuf,
    language: String,
}

impl TesseractOcr {
    pub fn new(program: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

/// Encode a rendered page as PNG bytes.
fn encode_png(page: usize, image: &PageImage) -> Result<Vec<u8>, ExtractError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| ExtractError::OcrFailed {
            page,
            detail: format!("image encoding failed: {}", e),
        })?;
    Ok(buf)
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, page: usize, image: &PageImage) -> Result<String, ExtractError> {
        let png = encode_png(page, image)?;
        let ocr_failed = |detail: String| ExtractError::OcrFailed { page, detail };

        let mut child = Command::new(&self.program)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ocr_failed(format!("failed to start {}: {}", self.program.display(), e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ocr_failed("tesseract stdin unavailable".into()))?;
        stdin
            .write_all(&png)
            .await
            .map_err(|e| ocr_failed(format!("failed to send image: {}", e)))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ocr_failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ocr_failed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR page {} → {} chars", page, text.len());
        Ok(text)
    }
}

/// Run every page through the OCR engine and join the results in page order,
/// each page followed by a newline.
pub async fn recognize_pages(
    ocr: &dyn OcrEngine,
    pages: &[PageImage],
) -> Result<String, ExtractError> {
    let mut text = String::new();
    for (idx, image) in pages.iter().enumerate() {
        let page_text = ocr.recognize(idx + 1, image).await?;
        text.push_str(&page_text);
        text.push('\n');
    }
    Ok(text)
}

/// Rasterise the PDF at `pdf_path`, recognise every page and return the
/// normalised text.
pub async fn extract_text(
    rasterizer: &dyn Rasterizer,
    ocr: &dyn OcrEngine,
    pdf_path: &Path,
    dpi: u32,
) -> Result<String, ExtractError> {
    info!("Converting text from PDF: {}", pdf_path.display());

    let pages = rasterizer.rasterize(pdf_path, dpi).await.inspect_err(|e| {
        warn!("Rasterisation failed: {}", e);
    })?;
    let raw = recognize_pages(ocr, &pages).await.inspect_err(|e| {
        warn!("OCR failed: {}", e);
    })?;
    // Page images are released here, before the text moves on.
    drop(pages);

    Ok(clean_text(&raw))
}
