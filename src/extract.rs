//! Request pipeline: one uploaded PDF in, one [`ResponseEnvelope`] out.
//!
//! ```text
//! upload ──▶ ingest ──▶ render ──▶ ocr ──▶ normalize ──▶ prompt ──▶ llm ──▶ parse ──▶ envelope
//! ```
//!
//! Each request owns every value it touches; [`Extractor`] itself only holds
//! the read-only config and the three external capabilities, so it can be
//! shared across concurrent requests behind an `Arc`.

use crate::config::ServiceConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::ExtractError;
use crate::pipeline::ingest::{validate_filename, TransientPdf};
use crate::pipeline::llm::{LlmClient, ProviderClient};
use crate::pipeline::normalize::has_enough_text;
use crate::pipeline::ocr::{extract_text, OcrEngine, TesseractOcr};
use crate::pipeline::parse::parse_model_output;
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use crate::prompts::build_prompt;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Longest prefix of the structured result written to the debug log.
const LOG_PREVIEW_CHARS: usize = 500;

/// Runs the extraction pipeline against injected rasterizer, OCR and LLM
/// capabilities.
#[derive(Clone)]
pub struct Extractor {
    config: Arc<ServiceConfig>,
    rasterizer: Arc<dyn Rasterizer>,
    ocr: Arc<dyn OcrEngine>,
    llm: Arc<dyn LlmClient>,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .field("rasterizer", &"<dyn Rasterizer>")
            .field("ocr", &"<dyn OcrEngine>")
            .field("llm", &"<dyn LlmClient>")
            .finish()
    }
}

impl Extractor {
    pub fn new(
        config: Arc<ServiceConfig>,
        rasterizer: Arc<dyn Rasterizer>,
        ocr: Arc<dyn OcrEngine>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            ocr,
            llm,
        }
    }

    /// Wire the production adapters: pdfium, tesseract and the configured
    /// LLM provider.
    pub fn from_config(config: Arc<ServiceConfig>) -> Result<Self, ExtractError> {
        let rasterizer = Arc::new(PdfiumRasterizer::new(config.pdfium_lib_path.clone()));
        let ocr = Arc::new(TesseractOcr::new(
            config.tesseract_path.clone(),
            config.ocr_language.clone(),
        ));
        let llm = Arc::new(ProviderClient::from_config(&config)?);
        Ok(Self::new(config, rasterizer, ocr, llm))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Handle one upload.
    ///
    /// Returns `Err` only for a rejected upload (non-PDF filename); nothing
    /// is written to disk in that case. Every other outcome, including
    /// rasterisation, OCR and parse failures, is an `Ok` envelope.
    pub async fn extract_upload(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ResponseEnvelope, ExtractError> {
        info!("Extraction requested for '{}' ({} bytes)", filename, bytes.len());
        validate_filename(filename)?;
        Ok(self.extract(bytes).await)
    }

    /// Run the pipeline over PDF bytes and map the outcome to an envelope.
    pub async fn extract(&self, bytes: &[u8]) -> ResponseEnvelope {
        let start = Instant::now();
        let envelope = match self.run(bytes).await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("Error processing PDF: {}", e);
                ResponseEnvelope::processing_failure(e)
            }
        };
        info!(
            "Extraction finished: success={} in {}ms",
            envelope.is_success(),
            start.elapsed().as_millis()
        );
        envelope
    }

    async fn run(&self, bytes: &[u8]) -> Result<ResponseEnvelope, ExtractError> {
        let config = &self.config;

        // Removed from disk when `staged` drops, on every path out of here.
        let staged = TransientPdf::persist(bytes)?;

        let text = extract_text(
            self.rasterizer.as_ref(),
            self.ocr.as_ref(),
            staged.path(),
            config.dpi,
        )
        .await?;
        info!("Extracted text length: {} characters", text.chars().count());

        if !has_enough_text(&text, config.min_text_chars) {
            warn!("Extracted text below {} characters; skipping LLM call", config.min_text_chars);
            return Ok(ResponseEnvelope::no_text());
        }

        let prompt = build_prompt(
            &text,
            config.extraction_prompt.as_deref(),
            config.max_prompt_chars,
        );

        let raw = match self.llm.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) if e.is_llm_failure() => {
                warn!("LLM extraction failed with error: {}", e);
                return Ok(ResponseEnvelope::ai_failure(e));
            }
            Err(e) => return Err(e),
        };
        info!("Received LLM response: {} chars", raw.trim().chars().count());

        let data = parse_model_output(&raw)?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let preview = serde_json::to_string(&data).unwrap_or_default();
            debug!(
                "Extracted structured data: {}...",
                crate::prompts::truncate_chars(&preview, LOG_PREVIEW_CHARS)
            );
        }

        Ok(ResponseEnvelope::success(data))
    }
}
