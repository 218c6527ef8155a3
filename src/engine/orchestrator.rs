use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{AgentResponse, Engine, EvaluationRequest, EvaluationResult};
use crate::agents::{Agent, find_agent};
use crate::backend::Backend;
use crate::error::EvaluationError;
use crate::events::{Event, EventBus};
use crate::prompts::{build_agent_prompt, build_summary_prompt};
use crate::scoring::{aggregate, collect_findings, parse_scores, parse_verdict};

const MIN_TEMPERATURE: f32 = 0.0;
const MAX_TEMPERATURE: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Issue the synthesis call after the agents have answered.
    pub summarize: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { summarize: true }
    }
}

/// Puts an idea in front of each agent in turn, then optionally synthesizes.
pub struct Orchestrator {
    backend: Arc<dyn Backend>,
    agents: Vec<Agent>,
    config: OrchestratorConfig,
    events: Option<Arc<EventBus>>,
}

impl Orchestrator {
    /// `agents` is the roster, already in the order they should be asked.
    pub fn new(backend: Arc<dyn Backend>, agents: Vec<Agent>, config: OrchestratorConfig) -> Self {
        Self {
            backend,
            agents,
            config,
            events: None,
        }
    }

    /// Publish progress on the given bus.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    /// Resolve the agents for a request, rejecting it before any call if invalid.
    ///
    /// Ids are checked against the whole registry: a registered agent that is
    /// off the roster is not unknown, it just is not selected.
    fn select(&self, request: &EvaluationRequest) -> Result<Vec<&Agent>, EvaluationError> {
        if request.idea_text.trim().is_empty() {
            return Err(EvaluationError::EmptyIdea);
        }

        if let Some(temperature) = request.temperature
            && !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature)
        {
            return Err(EvaluationError::InvalidTemperature(temperature.to_string()));
        }

        if let Some(unknown) = request.agents.iter().find(|id| {
            find_agent(id).is_none() && !self.agents.iter().any(|a| &a.id == *id)
        }) {
            return Err(EvaluationError::UnknownAgent(unknown.clone()));
        }

        let selected: Vec<&Agent> = self
            .agents
            .iter()
            .filter(|a| request.agents.is_empty() || request.agents.contains(&a.id))
            .collect();

        if selected.is_empty() {
            return Err(EvaluationError::NoAgents);
        }
        Ok(selected)
    }

    async fn ask(&self, agent: &Agent, request: &EvaluationRequest) -> AgentResponse {
        self.emit(Event::AgentStarted {
            agent_id: agent.id.clone(),
            display_name: agent.display_name.clone(),
        });

        let prompt = build_agent_prompt(agent, request);
        info!(agent = %agent.id, backend = self.backend.name(), "calling agent");

        let response = match self.backend.complete(&prompt).await {
            Ok(completion) => {
                let scores = parse_scores(&completion.text);
                if scores.is_none() {
                    debug!(agent = %agent.id, "answer carried no usable scores");
                }
                AgentResponse {
                    agent_id: agent.id.clone(),
                    display_name: agent.display_name.clone(),
                    text: completion.text,
                    error: None,
                    usage: completion.usage,
                    scores,
                }
            }
            Err(e) => {
                warn!(agent = %agent.id, error = %e, "agent call failed");
                AgentResponse {
                    agent_id: agent.id.clone(),
                    display_name: agent.display_name.clone(),
                    text: String::new(),
                    error: Some(e.to_string()),
                    usage: None,
                    scores: None,
                }
            }
        };

        self.emit(Event::AgentFinished {
            agent_id: agent.id.clone(),
            ok: response.is_ok(),
        });
        response
    }
}

#[async_trait]
impl Engine for Orchestrator {
    async fn evaluate(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResult, EvaluationError> {
        let selected = self.select(request)?;
        self.emit(Event::EvaluationStarted {
            agents: selected.len(),
        });

        let mut result = EvaluationResult::default();

        for agent in selected {
            let response = self.ask(agent, request).await;
            if let Some(usage) = response.usage {
                result.usage.add(usage);
            }
            result.responses.push(response);
        }

        result.scores = aggregate(&result.responses);
        (result.key_insights, result.risks) = collect_findings(&result.responses);

        let succeeded = result.responses.iter().any(AgentResponse::is_ok);

        if self.config.summarize && succeeded {
            self.emit(Event::SummaryStarted);
            let prompt = build_summary_prompt(request, &result.responses);
            match self.backend.complete(&prompt).await {
                Ok(completion) => {
                    if let Some(usage) = completion.usage {
                        result.usage.add(usage);
                    }
                    result.verdict = parse_verdict(&completion.text);
                    result.summary = Some(completion.text);
                }
                Err(e) => {
                    warn!(error = %e, "summary call failed");
                    result.summary_error = Some(e.to_string());
                }
            }
            self.emit(Event::SummaryFinished {
                ok: result.summary.is_some(),
            });
        } else if self.config.summarize {
            info!("every agent failed, skipping summary");
        }

        let failed = result.failed_count();
        info!(
            agents = result.responses.len(),
            failed,
            overall = result.scores.as_ref().map(|s| s.overall),
            tokens = result.usage.total(),
            "evaluation finished"
        );
        self.emit(Event::EvaluationFinished { failed });

        Ok(result)
    }
}
