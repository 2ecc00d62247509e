//! The response envelope returned for every pipeline outcome.
//!
//! `success = true` always carries `error: null`; `success = false` always
//! carries `data: {}`. The constructors are the only way to build an
//! envelope, so the two halves cannot disagree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model output: string keys to arbitrary JSON values. No schema is enforced.
pub type StructuredResult = Map<String, Value>;

/// Message returned when OCR produced too little text to be worth an LLM call.
pub const NO_TEXT_MESSAGE: &str = "No text could be extracted from the PDF.";

/// Prefix for failures of the LLM call itself.
pub const AI_FAILURE_PREFIX: &str = "AI extraction failed: ";

/// Prefix for every other processing failure.
pub const PROCESSING_FAILURE_PREFIX: &str = "Processing failed: ";

/// `{ success, data, error }` wrapper around an extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    success: bool,
    data: StructuredResult,
    error: Option<String>,
}

impl ResponseEnvelope {
    /// A successful extraction.
    pub fn success(data: StructuredResult) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    /// A failed extraction with an already-formatted message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: StructuredResult::new(),
            error: Some(message.into()),
        }
    }

    /// OCR text was empty or below the threshold.
    pub fn no_text() -> Self {
        Self::failure(NO_TEXT_MESSAGE)
    }

    /// The LLM call could not produce an answer.
    pub fn ai_failure(cause: impl std::fmt::Display) -> Self {
        Self::failure(format!("{AI_FAILURE_PREFIX}{cause}"))
    }

    /// Any other failure while processing the upload.
    pub fn processing_failure(cause: impl std::fmt::Display) -> Self {
        Self::failure(format!("{PROCESSING_FAILURE_PREFIX}{cause}"))
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &StructuredResult {
        &self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
