//! # pdf-form-extract
//!
//! Turn an uploaded scanned PDF form into structured JSON.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF upload
//!  │
//!  ├─ 1. Ingest     validate the filename, stage bytes in a temp file
//!  ├─ 2. Render     rasterise every page at 300 DPI via pdfium (spawn_blocking)
//!  ├─ 3. OCR        tesseract per page, joined in page order
//!  ├─ 4. Normalize  collapse whitespace; stop early if there is no text
//!  ├─ 5. Prompt     extraction template + first 15 000 characters
//!  ├─ 6. LLM        one call to the configured model (default gemini-2.5-flash)
//!  ├─ 7. Parse      bare JSON, fenced JSON, or {"rawResponse": …}
//!  └─ 8. Envelope   {"success", "data", "error"}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_form_extract::{serve, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     serve(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-form-extract` binary (clap + anyhow + dotenvy + tracing-subscriber) |
//! | `testing` | off | Exposes the deterministic pipeline doubles (`testing` module) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod server;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use envelope::{ResponseEnvelope, StructuredResult};
pub use error::ExtractError;
pub use extract::Extractor;
pub use server::{router, serve, AppState};
