pub mod mock;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Provider, Settings};
use crate::error::BackendError;

/// A two-part prompt: the persona (system) and the ask (user).
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// Overrides the backend's configured model for this call.
    pub model: Option<String>,
    /// Overrides the backend's configured temperature for this call.
    pub temperature: Option<f32>,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            model: None,
            temperature: None,
        }
    }

    pub fn with_overrides(mut self, model: Option<&str>, temperature: Option<f32>) -> Self {
        self.model = model.map(str::to_string);
        self.temperature = temperature;
        self
    }
}

/// Token usage from a single completion call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Accumulate another usage into this one.
    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    /// Total tokens (input + output).
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// The text a backend produced plus optional token usage.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// An opaque text-completion capability. Could be OpenAI, Ollama, or a test script.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Provider label, e.g. `"openai"`.
    fn name(&self) -> &str;
    fn model(&self) -> &str;
    async fn complete(&self, prompt: &Prompt) -> Result<Completion, BackendError>;
}

/// Wire up the backend selected by the settings.
pub fn build_backend(settings: &Settings) -> Result<Arc<dyn Backend>, BackendError> {
    match settings.provider {
        Provider::OpenAi => {
            let api_key = settings
                .openai_api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| {
                    BackendError::ConfigurationMissing(
                        "OPENAI_API_KEY is not set. Add it to .env or set USE_OLLAMA=true."
                            .to_string(),
                    )
                })?;
            let backend = openai::OpenAiBackend::new(
                api_key,
                settings.model().to_string(),
                settings.temperature,
            )
            .with_base_url(&settings.openai_base_url);
            Ok(Arc::new(backend))
        }
        Provider::Ollama => {
            let backend = ollama::OllamaBackend::new(
                &settings.ollama_url,
                settings.model().to_string(),
                settings.temperature,
            );
            Ok(Arc::new(backend))
        }
    }
}

/// Strip a trailing slash so `{base}/path` joins cleanly.
pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Map a transport-level reqwest failure onto [`BackendError`].
pub(crate) fn transport_error(url: &str, err: reqwest::Error) -> BackendError {
    if err.is_decode() {
        BackendError::Malformed(err.to_string())
    } else {
        BackendError::Unreachable {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
