//! Error types for the pdf-form-extract library.
//!
//! Every stage of the extraction pipeline reports failure through a single
//! enum, [`ExtractError`]. The request handler in [`crate::extract`] decides
//! what each variant means for the caller:
//!
//! * [`ExtractError::NotAPdf`] and [`ExtractError::MissingUpload`] are
//!   validation errors and become HTTP 400 before any stage runs.
//! * [`ExtractError::LlmApiError`] and [`ExtractError::LlmTimeout`] are the
//!   "could not get an answer" outcomes of the LLM boundary; they become an
//!   `AI extraction failed: …` envelope.
//! * Everything else is a processing failure and becomes a
//!   `Processing failed: …` envelope.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// The uploaded filename does not carry the `.pdf` extension.
    #[error("Only PDF files are supported")]
    NotAPdf { filename: String },

    /// The multipart body carried no file field.
    #[error("No file uploaded")]
    MissingUpload,

    /// Could not create or write the transient copy of the upload.
    #[error("Failed to store upload in a temporary file: {source}")]
    TransientStorage {
        #[source]
        source: std::io::Error,
    },

    // ── Rasterisation / OCR errors ────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error("OCR extraction failed: could not load pdfium: {0}")]
    PdfiumBindingFailed(String),

    /// pdfium could not open or render the document.
    #[error("OCR extraction failed: {detail}")]
    RasterisationFailed { path: PathBuf, detail: String },

    /// The OCR engine failed on a page.
    #[error("OCR extraction failed: page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider could not be constructed (missing key etc.).
    #[error("LLM provider '{provider}' is not configured: {hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API call failed (network, quota, auth).
    #[error("{message}")]
    LlmApiError { message: String },

    /// The LLM API call exceeded the configured timeout.
    #[error("API timeout - request took too long")]
    LlmTimeout { secs: u64 },

    // ── Response errors ───────────────────────────────────────────────────
    /// A JSON-looking span was found in the model output but did not parse.
    #[error("{source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Server errors ─────────────────────────────────────────────────────
    /// The listening socket could not be opened.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Whether this error is a rejected upload rather than a pipeline failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExtractError::NotAPdf { .. } | ExtractError::MissingUpload
        )
    }

    /// Whether this error came from the LLM call itself.
    pub fn is_llm_failure(&self) -> bool {
        matches!(
            self,
            ExtractError::LlmApiError { .. } | ExtractError::LlmTimeout { .. }
        )
    }
}
