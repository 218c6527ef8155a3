pub mod orchestrator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::TokenUsage;
use crate::error::EvaluationError;
use crate::scoring::{AgentScores, PanelScores, Verdict};

/// One user submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub idea_text: String,
    #[serde(default)]
    pub context: Option<String>,
    /// Restrict to these agent ids. Empty means the whole roster.
    #[serde(default)]
    pub agents: Vec<String>,
    /// Model for this request only, instead of the configured one.
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature for this request only, `0..=2`.
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl EvaluationRequest {
    pub fn new(idea_text: impl Into<String>) -> Self {
        Self {
            idea_text: idea_text.into(),
            context: None,
            agents: Vec::new(),
            model: None,
            temperature: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_agents(mut self, agents: Vec<String>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Trimmed model override, or `None` when absent or blank.
    pub fn model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Trimmed context, or `None` when absent or blank.
    pub fn context(&self) -> Option<&str> {
        self.context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// What one agent said, or why it could not say anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: String,
    pub display_name: String,
    /// Empty when `error` is set.
    pub text: String,
    pub error: Option<String>,
    pub usage: Option<TokenUsage>,
    /// Scores read from the answer, when it carried a usable block.
    #[serde(default)]
    pub scores: Option<AgentScores>,
}

impl AgentResponse {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// One entry per evaluated agent, in roster order.
    pub responses: Vec<AgentResponse>,
    pub summary: Option<String>,
    /// Set when the synthesis call was made and failed.
    pub summary_error: Option<String>,
    /// Tokens across every call, including the synthesis.
    pub usage: TokenUsage,
    /// Averages over the agents that returned scores.
    #[serde(default)]
    pub scores: Option<PanelScores>,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    /// The advisor's pursue/skip call, read from the summary.
    #[serde(default)]
    pub verdict: Option<Verdict>,
}

impl EvaluationResult {
    pub fn failed_count(&self) -> usize {
        self.responses.iter().filter(|r| !r.is_ok()).count()
    }
}

/// The outermost boundary. The web layer and the CLI only know this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn evaluate(&self, request: &EvaluationRequest)
    -> Result<EvaluationResult, EvaluationError>;
}
