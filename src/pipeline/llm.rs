//! LLM interaction: send the assembled prompt and return the raw reply text.
//!
//! The whole prompt travels as a single user message; there is no system
//! message and no streaming. Failures of the call itself (network, quota,
//! auth, timeout) come back as `Err` so the caller can report "could not get
//! an answer" without unwinding. A reply that arrives but is not JSON is
//! still `Ok`; classifying it is [`crate::pipeline::parse`]'s job.

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use async_trait::async_trait;
use edgequake_llm::{
    AnthropicProvider, ChatMessage, GeminiProvider, LLMProvider, OpenAIProvider, ProviderFactory,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Submits a prompt to a generative model and returns its raw text.
///
/// Implementations return only [`ExtractError::LlmApiError`] or
/// [`ExtractError::LlmTimeout`] on failure.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ExtractError>;
}

/// [`LlmClient`] backed by an `edgequake_llm` provider.
#[derive(Clone)]
pub struct ProviderClient {
    provider: Arc<dyn LLMProvider>,
    timeout_secs: u64,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("provider", &"<dyn LLMProvider>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderClient {
    /// Wrap a pre-built provider.
    pub fn new(provider: Arc<dyn LLMProvider>, timeout_secs: u64) -> Self {
        Self {
            provider,
            timeout_secs,
        }
    }

    /// Construct the configured provider/model pair.
    ///
    /// Providers with an API-key constructor receive `config.api_key`
    /// directly. Anything else is resolved by `ProviderFactory`, which reads
    /// its own environment.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ExtractError> {
        let provider = build_provider(config)?;
        info!(
            "LLM provider ready: {} / {}",
            config.provider, config.model
        );
        Ok(Self::new(provider, config.api_timeout_secs))
    }
}

fn build_provider(config: &ServiceConfig) -> Result<Arc<dyn LLMProvider>, ExtractError> {
    let key = config.api_key.as_str();
    let model = config.model.as_str();
    let provider: Arc<dyn LLMProvider> = match config.provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Arc::new(GeminiProvider::new(key).with_model(model)),
        "openai" => Arc::new(OpenAIProvider::new(key).with_model(model)),
        "anthropic" | "claude" => Arc::new(AnthropicProvider::new(key).with_model(model)),
        other => {
            debug!("No explicit-key constructor for '{}'; using ProviderFactory", other);
            ProviderFactory::create_llm_provider(other, model).map_err(|e| {
                ExtractError::ProviderNotConfigured {
                    provider: config.provider.clone(),
                    hint: format!("{e}"),
                }
            })?
        }
    };
    Ok(provider)
}

#[async_trait]
impl LlmClient for ProviderClient {
    async fn generate(&self, prompt: &str) -> Result<String, ExtractError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];

        info!("Calling LLM API ({} prompt chars)...", prompt.chars().count());
        let call = self.provider.chat(&messages, None);

        match timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(response)) => {
                debug!(
                    "LLM reply: {} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
            Ok(Err(e)) => {
                let message = format!("{}", e);
                warn!("LLM call failed: {}", message);
                Err(ExtractError::LlmApiError { message })
            }
            Err(_) => {
                warn!("LLM call timed out after {} seconds", self.timeout_secs);
                Err(ExtractError::LlmTimeout {
                    secs: self.timeout_secs,
                })
            }
        }
    }
}
