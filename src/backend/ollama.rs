use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BackendError;

use super::{Backend, Completion, Prompt, TokenUsage, transport_error, trim_base};

/// How long the availability check waits for `/tags`.
pub const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(2);

/// A backend that calls a local Ollama server's `/generate` endpoint.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaBackend {
    /// `base_url` is the API root, e.g. `http://localhost:11434/api`.
    pub fn new(base_url: &str, model: String, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: trim_base(base_url),
            model,
            temperature,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the server answers on `/tags` within [`AVAILABILITY_TIMEOUT`].
    /// Any failure counts as unavailable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/tags", self.base_url);
        match self.client.get(&url).timeout(AVAILABILITY_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(%url, error = %e, "ollama availability check failed");
                false
            }
        }
    }

    /// Names of the models installed on the server.
    pub async fn models(&self) -> Result<Vec<String>, BackendError> {
        let url = format!("{}/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn parse_response(resp: GenerateResponse) -> Result<Completion, BackendError> {
        if resp.response.trim().is_empty() {
            return Err(BackendError::Malformed(
                "ollama returned an empty response".to_string(),
            ));
        }

        let usage = match (resp.prompt_eval_count, resp.eval_count) {
            (None, None) => None,
            (input, output) => Some(TokenUsage {
                input_tokens: input.unwrap_or(0),
                output_tokens: output.unwrap_or(0),
            }),
        };

        Ok(Completion {
            text: resp.response,
            usage,
        })
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Completion, BackendError> {
        let url = format!("{}/generate", self.base_url);
        let model = prompt.model.as_deref().unwrap_or(&self.model);
        let body = GenerateRequest {
            model,
            system: &prompt.system,
            prompt: &prompt.user,
            stream: false,
            options: Options {
                temperature: prompt.temperature.unwrap_or(self.temperature),
            },
        };

        tracing::debug!(%model, prompt_chars = prompt.user.len(), "ollama request");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let generated: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        Self::parse_response(generated)
    }
}

// --- API types ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: Options,
}

#[derive(Serialize)]
struct Options {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Completion, BackendError> {
        let resp: GenerateResponse = serde_json::from_str(json).unwrap();
        OllamaBackend::parse_response(resp)
    }

    #[test]
    fn parses_response_and_counts() {
        let completion = parse(
            r#"{"model": "llama3.1", "response": "Go for it.", "done": true,
                "prompt_eval_count": 40, "eval_count": 12}"#,
        )
        .unwrap();
        assert_eq!(completion.text, "Go for it.");
        assert_eq!(
            completion.usage,
            Some(TokenUsage {
                input_tokens: 40,
                output_tokens: 12
            })
        );
    }

    #[test]
    fn counts_are_optional() {
        let completion = parse(r#"{"response": "fine"}"#).unwrap();
        assert!(completion.usage.is_none());
    }

    #[test]
    fn empty_response_is_malformed() {
        let err = parse(r#"{"response": "   ", "done": true}"#).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn request_disables_streaming() {
        let body = GenerateRequest {
            model: "llama3.1",
            system: "persona",
            prompt: "idea",
            stream: false,
            options: Options { temperature: 0.25 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["system"], "persona");
        assert_eq!(json["prompt"], "idea");
        assert_eq!(json["options"]["temperature"], 0.25);
    }

    #[test]
    fn availability_timeout_is_two_seconds() {
        assert_eq!(AVAILABILITY_TIMEOUT, Duration::from_secs(2));
    }

    #[test]
    fn base_url_is_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/api/", "m".into(), 0.7);
        assert_eq!(backend.base_url(), "http://localhost:11434/api");
    }
}
