//! Runtime settings.
//!
//! Provider, model, and temperature come from the environment (a `.env`
//! file is loaded first by `main`). Which agents sit on the panel is
//! persisted separately in [`selection::AgentSelection`].

pub mod selection;

use std::fmt;

use crate::consts::{
    DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
    DEFAULT_TEMPERATURE,
};
use crate::error::ConfigError;

/// Which completion backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Ollama,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub ollama_model: String,
    pub ollama_url: String,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::OpenAi,
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let provider = match get("USE_OLLAMA") {
            Some(v) if v.trim().eq_ignore_ascii_case("true") => Provider::Ollama,
            _ => Provider::OpenAi,
        };

        let temperature = match get("OPENAI_TEMPERATURE") {
            Some(raw) => parse_temperature("OPENAI_TEMPERATURE", &raw)?,
            None => defaults.temperature,
        };

        Ok(Self {
            provider,
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            ollama_model: get("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            ollama_url: get("OLLAMA_API_URL").unwrap_or(defaults.ollama_url),
            temperature,
        })
    }

    /// The model name for the active provider.
    pub fn model(&self) -> &str {
        match self.provider {
            Provider::OpenAi => &self.openai_model,
            Provider::Ollama => &self.ollama_model,
        }
    }

    /// Override the model for the active provider.
    pub fn set_model(&mut self, model: String) {
        match self.provider {
            Provider::OpenAi => self.openai_model = model,
            Provider::Ollama => self.ollama_model = model,
        }
    }
}

/// Parse a sampling temperature, accepting `0.0..=2.0`.
pub fn parse_temperature(key: &'static str, raw: &str) -> Result<f32, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let value: f32 = raw.trim().parse().map_err(|_| invalid("not a number"))?;
    if !(0.0..=2.0).contains(&value) {
        return Err(invalid("must be between 0 and 2"));
    }
    Ok(value)
}
