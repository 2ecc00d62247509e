//! Deterministic stand-ins for the rasterizer, OCR engine and LLM client.
//!
//! They never touch pdfium, tesseract or the network, and they count their
//! calls so tests can assert which stages ran.

use crate::error::ExtractError;
use crate::pipeline::llm::LlmClient;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::render::{PageImage, Rasterizer};
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Rasterizer that returns `pages` blank images, or a fixed error.
#[derive(Debug)]
pub struct StubRasterizer {
    pages: usize,
    failure: Option<String>,
    calls: AtomicUsize,
    last_path: Mutex<Option<PathBuf>>,
}

impl StubRasterizer {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            failure: None,
            calls: AtomicUsize::new(0),
            last_path: Mutex::new(None),
        }
    }

    /// Every call fails with `RasterisationFailed { detail }`.
    pub fn failing(detail: impl Into<String>) -> Self {
        Self {
            failure: Some(detail.into()),
            ..Self::with_pages(0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Path handed to the most recent call.
    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl Rasterizer for StubRasterizer {
    async fn rasterize(&self, pdf_path: &Path, _dpi: u32) -> Result<Vec<PageImage>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_path.lock() {
            *last = Some(pdf_path.to_path_buf());
        }

        if let Some(ref detail) = self.failure {
            return Err(ExtractError::RasterisationFailed {
                path: pdf_path.to_path_buf(),
                detail: detail.clone(),
            });
        }

        Ok((0..self.pages)
            .map(|_| PageImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]))))
            .collect())
    }
}

/// OCR engine that returns one scripted text per call, in call order.
///
/// Calls past the end of the script return an empty page.
#[derive(Debug)]
pub struct ScriptedOcr {
    pages: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedOcr {
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for ScriptedOcr {
    async fn recognize(&self, _page: usize, _image: &PageImage) -> Result<String, ExtractError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.get(idx).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
enum CannedOutcome {
    Reply(String),
    ApiError(String),
    Timeout(u64),
}

/// LLM client with a fixed outcome that records every prompt it receives.
#[derive(Debug)]
pub struct CannedLlm {
    outcome: CannedOutcome,
    prompts: Mutex<Vec<String>>,
}

impl CannedLlm {
    fn with(outcome: CannedOutcome) -> Self {
        Self {
            outcome,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `text`.
    pub fn reply(text: impl Into<String>) -> Self {
        Self::with(CannedOutcome::Reply(text.into()))
    }

    /// Always fails as an API error with `message`.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::with(CannedOutcome::ApiError(message.into()))
    }

    /// Always fails as a timeout.
    pub fn timeout(secs: u64) -> Self {
        Self::with(CannedOutcome::Timeout(secs))
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for CannedLlm {
    async fn generate(&self, prompt: &str) -> Result<String, ExtractError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.outcome {
            CannedOutcome::Reply(text) => Ok(text.clone()),
            CannedOutcome::ApiError(message) => Err(ExtractError::LlmApiError {
                message: message.clone(),
            }),
            CannedOutcome::Timeout(secs) => Err(ExtractError::LlmTimeout { secs: *secs }),
        }
    }
}
