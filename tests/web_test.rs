use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use council::agents::list_agents;
use council::backend::mock::MockBackend;
use council::engine::orchestrator::{Orchestrator, OrchestratorConfig};
use council::web::{AppState, app_router, escape_html};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(backend: Arc<MockBackend>) -> Router {
    let agents = list_agents();
    let orchestrator = Orchestrator::new(backend, agents.clone(), OrchestratorConfig::default());
    app_router(AppState {
        engine: Arc::new(orchestrator),
        agents: Arc::new(agents),
        backend_label: "mock (mock)".to_string(),
    })
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/evaluate")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn index_lists_every_agent() {
    let response = app(Arc::new(MockBackend::echo()))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    for agent in list_agents() {
        assert!(html.contains(&format!("name=\"agent_{}\" checked>", agent.id)));
        assert!(html.contains(&escape_html(&agent.display_name)));
    }
    assert!(html.contains("mock (mock)"));
}

#[tokio::test]
async fn every_persona_renders_escaped() {
    let response = app(Arc::new(MockBackend::echo()))
        .oneshot(form_post("idea=smart+mug"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    for agent in list_agents() {
        let name = escape_html(&agent.display_name);
        assert!(
            html.contains(&format!("<strong>{name}</strong>")),
            "{} missing from the form",
            agent.id
        );
        assert!(html.contains(&escape_html(&agent.description)));
        assert!(
            html.contains(&format!(
                "<div class=\"agent-result\" id=\"agent-{}\"><h3>{name}</h3>",
                agent.id
            )),
            "{} missing from the results",
            agent.id
        );
    }
    // The apostrophe in Adam D'Angelo never reaches the page raw.
    assert!(html.contains("Adam D&#39;Angelo"));
    assert!(!html.contains("Adam D'Angelo"));
}

#[tokio::test]
async fn form_with_empty_idea_is_rejected_without_calls() {
    let backend = Arc::new(MockBackend::echo());
    let response = app(backend.clone())
        .oneshot(form_post("idea=++&context="))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("idea text must not be empty"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn form_evaluates_selected_agents() {
    let backend = Arc::new(MockBackend::echo());
    let response = app(backend.clone())
        .oneshot(form_post(
            "idea=AI-powered+plant+watering+sensor&context=&agent_sam_altman=on&agent_elon_musk=on",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("id=\"agent-sam_altman\""));
    assert!(html.contains("id=\"agent-elon_musk\""));
    assert!(!html.contains("id=\"agent-demis_hassabis\""));
    assert!(html.contains("<h2>Summary</h2>"));
    // The form keeps what was typed.
    assert!(html.contains(">AI-powered plant watering sensor</textarea>"));
    // Two agents plus the summary.
    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn form_with_bad_temperature_is_rejected() {
    let backend = Arc::new(MockBackend::echo());
    let response = app(backend.clone())
        .oneshot(form_post("idea=smart+mug&model=llama3.2&temperature=warm"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("temperature must be a number between 0 and 2, got warm"));
    // What was typed survives the round trip.
    assert!(html.contains(r#"name="model" value="llama3.2""#));
    assert!(html.contains(r#"name="temperature" value="warm""#));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn form_overrides_reach_the_backend() {
    let backend = Arc::new(MockBackend::echo());
    let response = app(backend.clone())
        .oneshot(form_post(
            "idea=smart+mug&model=llama3.2&temperature=0.4&agent_sam_altman=on",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for prompt in backend.prompts() {
        assert_eq!(prompt.model.as_deref(), Some("llama3.2"));
        assert_eq!(prompt.temperature, Some(0.4));
    }
}

#[tokio::test]
async fn api_agents_returns_registry() {
    let response = app(Arc::new(MockBackend::echo()))
        .oneshot(
            Request::builder()
                .uri("/api/agents")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let agents: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let agents = agents.as_array().unwrap();
    assert_eq!(agents.len(), list_agents().len());
    assert_eq!(agents[0]["id"], "sam_altman");
    assert_eq!(agents[0]["display_name"], "Sam Altman");
}

#[tokio::test]
async fn api_evaluate_returns_result_json() {
    let response = app(Arc::new(MockBackend::echo()))
        .oneshot(json_post(
            "/api/evaluate",
            json!({
                "idea_text": "AI-powered plant watering sensor",
                "context": "hobby gardeners",
                "agents": ["demis_hassabis"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result: Value = serde_json::from_str(&body_text(response).await).unwrap();
    // Echoed prompts carry only the score template, so nothing is scored.
    assert!(result["scores"].is_null());
    assert_eq!(result["key_insights"], json!([]));
    let responses = result["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["agent_id"], "demis_hassabis");
    assert!(responses[0]["error"].is_null());
    let text = responses[0]["text"].as_str().unwrap();
    assert!(text.contains("Demis Hassabis"));
    assert!(text.contains("hobby gardeners"));
    assert!(result["summary"].is_string());
}

#[tokio::test]
async fn api_evaluate_rejects_bad_requests() {
    let backend = Arc::new(MockBackend::echo());
    let router = app(backend.clone());

    let response = router
        .clone()
        .oneshot(json_post("/api/evaluate", json!({"idea_text": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "idea text must not be empty");

    let response = router
        .clone()
        .oneshot(json_post(
            "/api/evaluate",
            json!({"idea_text": "x", "agents": ["nobody"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "unknown agent: nobody");

    let response = router
        .oneshot(json_post(
            "/api/evaluate",
            json!({"idea_text": "x", "temperature": 4.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app(Arc::new(MockBackend::echo()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({"status": "ok", "service": "council"}));
}
