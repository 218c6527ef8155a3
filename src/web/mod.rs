//! HTTP surface: an HTML form for people and a JSON API for scripts.

mod render;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agents::Agent;
use crate::engine::{Engine, EvaluationRequest};
use crate::error::EvaluationError;

pub use render::escape_html;

/// Form field prefix for the per-agent checkboxes, e.g. `agent_sam_altman=on`.
const AGENT_FIELD_PREFIX: &str = "agent_";

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn Engine>,
    /// The roster the engine was built with, for rendering the form.
    pub agents: Arc<Vec<Agent>>,
    /// Shown in the page footer, e.g. `"openai (gpt-4o)"`.
    pub backend_label: String,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/evaluate", post(evaluate_form))
        .route("/health", get(health))
        .route("/api/agents", get(list_agents))
        .route("/api/evaluate", post(evaluate_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("council listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render::page(
        &state.agents,
        &state.backend_label,
        &render::FormValues::default(),
        None,
        None,
    ))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "council"}))
}

async fn list_agents(State(state): State<AppState>) -> Json<Vec<Agent>> {
    Json(state.agents.as_ref().clone())
}

/// Agent ids ticked in the form, sorted.
fn form_agents(fields: &HashMap<String, String>) -> Vec<String> {
    let mut agents: Vec<String> = fields
        .keys()
        .filter_map(|k| k.strip_prefix(AGENT_FIELD_PREFIX))
        .map(str::to_string)
        .collect();
    agents.sort();
    agents
}

/// A non-blank form field, trimmed.
fn form_field<'a>(fields: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Build a request from urlencoded form fields.
fn form_request(fields: &HashMap<String, String>) -> Result<EvaluationRequest, EvaluationError> {
    let temperature = form_field(fields, "temperature")
        .map(|raw| {
            raw.parse::<f32>()
                .map_err(|_| EvaluationError::InvalidTemperature(raw.to_string()))
        })
        .transpose()?;

    Ok(EvaluationRequest {
        idea_text: fields.get("idea").cloned().unwrap_or_default(),
        context: form_field(fields, "context").map(str::to_string),
        agents: form_agents(fields),
        model: form_field(fields, "model").map(str::to_string),
        temperature,
    })
}

async fn evaluate_form(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let values = render::FormValues::from_fields(&fields, form_agents(&fields));
    let outcome = match form_request(&fields) {
        Ok(request) => state.engine.evaluate(&request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => Html(render::page(
            &state.agents,
            &state.backend_label,
            &values,
            Some(&result),
            None,
        ))
        .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Html(render::page(
                &state.agents,
                &state.backend_label,
                &values,
                None,
                Some(&e.to_string()),
            )),
        )
            .into_response(),
    }
}

async fn evaluate_json(
    State(state): State<AppState>,
    Json(request): Json<EvaluationRequest>,
) -> Response {
    match state.engine.evaluate(&request).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => validation_error(e).into_response(),
    }
}

fn validation_error(err: EvaluationError) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": err.to_string()})),
    )
}
