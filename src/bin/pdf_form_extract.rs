//! Server binary for pdf-form-extract.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ServiceConfig`, sets up logging, and serves HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_form_extract::config::{DEFAULT_DPI, DEFAULT_MAX_PROMPT_CHARS, DEFAULT_MIN_TEXT_CHARS};
use pdf_form_extract::{serve, ServiceConfig};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start with defaults (0.0.0.0:8000, CORS for http://localhost:3000)
  GEMINI_API_KEY=... pdf-form-extract

  # Custom port and frontend origin
  pdf-form-extract --port 9000 --frontend-url https://forms.example.com

  # Operator-supplied extraction prompt
  pdf-form-extract --prompt-file prompts/insurance_claim.txt

  # Extract a form
  curl -F "file=@application.pdf" http://localhost:8000/extract-pdf

ENDPOINTS:
  GET  /health        Service status
  POST /extract-pdf   Multipart upload (field "file"), returns
                      {"success": bool, "data": {...}, "error": string|null}

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY      LLM credential (required)
  FRONTEND_URL        Allowed CORS origin
  PDFIUM_LIB_PATH     Path to libpdfium; defaults to the system library
  TESSERACT_PATH      tesseract executable
  RUST_LOG            Log filter, e.g. pdf_form_extract=debug

A .env file in the working directory is loaded if present.
"#;

/// Extract structured JSON from scanned PDF forms with OCR and an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-form-extract",
    version,
    about = "Serve PDF form extraction (OCR + LLM) over HTTP",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Listening host.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listening port.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Browser origin allowed by CORS.
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    frontend_url: String,

    /// LLM API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ...
    #[arg(long, env = "LLM_PROVIDER", default_value = "gemini")]
    provider: String,

    /// LLM model ID.
    #[arg(long, env = "LLM_MODEL", default_value = "gemini-2.5-flash")]
    model: String,

    /// Rendering DPI for OCR (72–600).
    #[arg(long, env = "OCR_DPI", default_value_t = DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Tesseract language code(s), e.g. eng or deu+eng.
    #[arg(long, env = "OCR_LANGUAGE", default_value = "eng")]
    ocr_language: String,

    /// tesseract executable.
    #[arg(long = "tesseract", env = "TESSERACT_PATH", default_value = "tesseract")]
    tesseract_path: PathBuf,

    /// pdfium shared library; the system library is used when unset.
    #[arg(long = "pdfium-lib", env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Minimum non-whitespace characters of OCR text before calling the LLM.
    #[arg(long, default_value_t = DEFAULT_MIN_TEXT_CHARS)]
    min_text_chars: usize,

    /// Characters of OCR text embedded in the prompt.
    #[arg(long, default_value_t = DEFAULT_MAX_PROMPT_CHARS)]
    max_prompt_chars: usize,

    /// LLM call timeout in seconds.
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value_t = 60)]
    api_timeout: u64,

    /// Maximum request body in bytes.
    #[arg(long, default_value_t = 50 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Path to a text file containing a custom extraction prompt.
    #[arg(long, env = "EXTRACTION_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Must run before clap reads `env = ...` defaults.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;
    info!(
        model = %config.model,
        frontend_url = %config.frontend_url,
        "Starting PDF form extraction service on http://{}",
        config.bind_address()
    );

    serve(config).await.context("Server failed")?;
    Ok(())
}

/// Map CLI args to `ServiceConfig`.
async fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .host(&cli.host)
        .port(cli.port)
        .frontend_url(&cli.frontend_url)
        .api_key(cli.api_key.clone().unwrap_or_default())
        .provider(&cli.provider)
        .model(&cli.model)
        .dpi(cli.dpi)
        .ocr_language(&cli.ocr_language)
        .tesseract_path(&cli.tesseract_path)
        .min_text_chars(cli.min_text_chars)
        .max_prompt_chars(cli.max_prompt_chars)
        .api_timeout_secs(cli.api_timeout)
        .max_upload_bytes(cli.max_upload_bytes);

    if let Some(ref path) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }

    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read extraction prompt from {:?}", path))?;
        builder = builder.extraction_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}
