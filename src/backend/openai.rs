use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_OPENAI_BASE_URL;
use crate::error::BackendError;

use super::{Backend, Completion, Prompt, TokenUsage, transport_error, trim_base};

/// A backend that calls an OpenAI-compatible chat completions API.
pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn new(api_key: String, model: String, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key,
            model,
            temperature,
        }
    }

    /// Point at a different OpenAI-compatible server (proxy, vLLM, LM Studio...).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_messages(prompt: &Prompt) -> Vec<Message<'_>> {
        vec![
            Message {
                role: "system",
                content: &prompt.system,
            },
            Message {
                role: "user",
                content: &prompt.user,
            },
        ]
    }

    fn parse_response(resp: ApiResponse) -> Result<Completion, BackendError> {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(BackendError::Malformed(
                "completion contained no message content".to_string(),
            ));
        }

        Ok(Completion {
            text,
            usage: resp.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Completion, BackendError> {
        let url = self.endpoint();
        let messages = Self::build_messages(prompt);
        let model = prompt.model.as_deref().unwrap_or(&self.model);
        let body = ApiRequest {
            model,
            temperature: prompt.temperature.unwrap_or(self.temperature),
            messages: &messages,
        };

        tracing::debug!(%model, prompt_chars = prompt.user.len(), "openai request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Malformed(e.to_string()))?;

        Self::parse_response(api_resp)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [Message<'a>],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
