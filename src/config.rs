//! Configuration for the extraction service.
//!
//! All service behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`]. The config is read once at startup and then
//! shared read-only with the components that need it; nothing in the
//! pipeline looks up process-wide state on its own.

use crate::error::ExtractError;
use std::fmt;
use std::path::PathBuf;

/// Minimum number of non-whitespace characters the OCR text must contain
/// before the LLM is called.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 10;

/// Number of characters of extracted text embedded in the prompt.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 15_000;

/// Rendering resolution handed to the rasterizer.
pub const DEFAULT_DPI: u32 = 300;

/// Configuration for the extraction service.
///
/// Built via [`ServiceConfig::builder()`] or using [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_form_extract::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .api_key("test-key")
///     .port(9000)
///     .model("gemini-2.5-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.bind_address(), "0.0.0.0:9000");
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Listening host. Default: `0.0.0.0`.
    pub host: String,

    /// Listening port. Default: 8000.
    pub port: u16,

    /// The single browser origin allowed by CORS. Default: `http://localhost:3000`.
    pub frontend_url: String,

    /// Credential for the LLM service. Required.
    pub api_key: String,

    /// LLM provider name understood by `edgequake_llm::ProviderFactory`. Default: `gemini`.
    pub provider: String,

    /// LLM model identifier. Default: `gemini-2.5-flash`.
    pub model: String,

    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    ///
    /// Tesseract is tuned for roughly 300 DPI input; lower values lose small
    /// print on scanned forms, higher values mostly add processing time.
    pub dpi: u32,

    /// Tesseract language code(s), e.g. `eng` or `deu+eng`. Default: `eng`.
    pub ocr_language: String,

    /// Path or name of the tesseract executable. Default: `tesseract`.
    pub tesseract_path: PathBuf,

    /// Explicit pdfium shared library. If None, the system library is used.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Short-circuit threshold for extracted text. Default: 10.
    pub min_text_chars: usize,

    /// Truncation ceiling for text embedded in the prompt. Default: 15 000.
    pub max_prompt_chars: usize,

    /// Timeout for a single LLM call in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Maximum accepted request body in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,

    /// Operator-supplied extraction prompt. If None, uses the built-in template.
    pub extraction_prompt: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            frontend_url: "http://localhost:3000".to_string(),
            api_key: String::new(),
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            dpi: DEFAULT_DPI,
            ocr_language: "eng".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            pdfium_lib_path: None,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            api_timeout_secs: 60,
            max_upload_bytes: 50 * 1024 * 1024,
            extraction_prompt: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("api_key", &"<redacted>")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("dpi", &self.dpi)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_path", &self.tesseract_path)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("min_text_chars", &self.min_text_chars)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field(
                "extraction_prompt",
                &self.extraction_prompt.as_ref().map(|_| "<custom>"),
            )
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn frontend_url(mut self, url: impl Into<String>) -> Self {
        self.config.frontend_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn provider(mut self, name: impl Into<String>) -> Self {
        self.config.provider = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn max_prompt_chars(mut self, n: usize) -> Self {
        self.config.max_prompt_chars = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn extraction_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.extraction_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// A missing API key is rejected here so the process fails at startup
    /// instead of on the first request.
    pub fn build(self) -> Result<ServiceConfig, ExtractError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "an API key for the LLM service is required (set GEMINI_API_KEY)".into(),
            ));
        }
        if !(72..=600).contains(&c.dpi) {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.max_prompt_chars == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_prompt_chars must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.extraction_prompt.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ExtractError::InvalidConfig(
                "extraction prompt must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let c = ServiceConfig::default();
        assert_eq!(c.bind_address(), "0.0.0.0:8000");
        assert_eq!(c.frontend_url, "http://localhost:3000");
        assert_eq!(c.dpi, 300);
        assert_eq!(c.min_text_chars, 10);
        assert_eq!(c.max_prompt_chars, 15_000);
        assert_eq!(c.api_timeout_secs, 60);
        assert_eq!(c.model, "gemini-2.5-flash");
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = ServiceConfig::builder().build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn dpi_out_of_range_is_rejected() {
        let err = ServiceConfig::builder()
            .api_key("k")
            .dpi(1200)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("1200"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ServiceConfig::builder()
            .api_key("super-secret")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
