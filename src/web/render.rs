//! Server-side HTML for the evaluation form and results.

use std::collections::HashMap;

use crate::agents::Agent;
use crate::engine::EvaluationResult;
use crate::scoring::percent;

use super::AGENT_FIELD_PREFIX;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { margin-bottom: 0.2rem; }
textarea { width: 100%; font: inherit; }
fieldset { margin: 1rem 0; }
label.agent { display: block; margin: 0.2rem 0; }
.hint { color: #666; font-size: 0.9rem; }
.error { background: #fde8e8; border-left: 4px solid #c62828; padding: 0.5rem 1rem; }
.agent-result { border: 1px solid #ddd; border-radius: 6px; padding: 0.5rem 1rem; margin: 1rem 0; }
.agent-result.failed { border-color: #c62828; }
.summary { background: #eef5ff; border-radius: 6px; padding: 0.5rem 1rem; }
pre { white-space: pre-wrap; font: inherit; }
.scores { display: flex; gap: 1rem; flex-wrap: wrap; }
.metric { border: 1px solid #ddd; border-radius: 6px; padding: 0.5rem 1rem; min-width: 9rem; }
.metric strong { display: block; font-size: 1.6rem; }
.pursue { color: #2e7d32; }
.skip { color: #c62828; }
footer { margin-top: 2rem; color: #888; font-size: 0.8rem; }
"#;

/// What the user typed, echoed back into the form.
#[derive(Debug, Default)]
pub(super) struct FormValues {
    pub idea: String,
    pub context: String,
    pub model: String,
    pub temperature: String,
    pub agents: Vec<String>,
}

impl FormValues {
    pub fn from_fields(fields: &HashMap<String, String>, agents: Vec<String>) -> Self {
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
        Self {
            idea: field("idea"),
            context: field("context"),
            model: field("model"),
            temperature: field("temperature"),
            agents,
        }
    }

    fn is_checked(&self, agent_id: &str) -> bool {
        self.agents.is_empty() || self.agents.iter().any(|a| a == agent_id)
    }
}

/// Escape text for safe inclusion in HTML bodies and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn agent_checkboxes(agents: &[Agent], values: &FormValues) -> String {
    agents
        .iter()
        .map(|agent| {
            format!(
                r#"<label class="agent"><input type="checkbox" name="{prefix}{id}"{checked}> <strong>{name}</strong> <span class="hint">{description}</span></label>"#,
                prefix = AGENT_FIELD_PREFIX,
                id = escape_html(&agent.id),
                checked = if values.is_checked(&agent.id) { " checked" } else { "" },
                name = escape_html(&agent.display_name),
                description = escape_html(&agent.description),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn form(agents: &[Agent], values: &FormValues) -> String {
    format!(
        r#"<form method="post" action="/evaluate">
<label for="idea">Product idea</label>
<textarea id="idea" name="idea" rows="5" placeholder="Describe your product idea">{idea}</textarea>
<label for="context">Context (optional)</label>
<textarea id="context" name="context" rows="3" placeholder="Market, users, constraints, your background">{context}</textarea>
<fieldset>
<legend>Model (optional)</legend>
<label>Model <input type="text" name="model" value="{model}" placeholder="configured default"></label>
<label>Temperature <input type="number" name="temperature" value="{temperature}" min="0" max="2" step="0.1" placeholder="default"></label>
</fieldset>
<fieldset>
<legend>Panel</legend>
{checkboxes}
<p class="hint">Leaving every box unticked asks the whole panel.</p>
</fieldset>
<button type="submit">Evaluate</button>
</form>"#,
        idea = escape_html(&values.idea),
        context = escape_html(&values.context),
        model = escape_html(&values.model),
        temperature = escape_html(&values.temperature),
        checkboxes = agent_checkboxes(agents, values),
    )
}

fn metric(label: &str, score: f64) -> String {
    format!(
        "<div class=\"metric\">{}<strong>{}</strong></div>",
        label,
        percent(score)
    )
}

fn list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let items: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect();
    format!("<h3>{}</h3>\n<ul>{}</ul>\n", title, items)
}

fn overview(result: &EvaluationResult) -> String {
    let mut html = String::new();

    if let Some(scores) = &result.scores {
        html.push_str("<section id=\"scores\">\n<h2>Overall evaluation</h2>\n");
        html.push_str("<div class=\"scores\">");
        html.push_str(&metric("Overall score", scores.overall));
        html.push_str(&metric("Market potential", scores.market_potential));
        html.push_str(&metric("Technical feasibility", scores.technical_feasibility));
        html.push_str(&metric("Innovation potential", scores.innovation_potential));
        html.push_str(&format!(
            "</div>\n<p class=\"hint\">Averaged over {} scored agent(s).</p>\n",
            scores.scored_agents
        ));
        html.push_str("</section>\n");
    }

    if let Some(verdict) = &result.verdict {
        let (class, call) = if verdict.pursue {
            ("pursue", "Pursue")
        } else {
            ("skip", "Do not pursue")
        };
        html.push_str(&format!(
            "<p id=\"verdict\" class=\"{class}\"><strong>{call}</strong> ({confidence} confidence){timeline}</p>\n",
            class = class,
            call = call,
            confidence = percent(verdict.confidence),
            timeline = verdict
                .timeline
                .as_deref()
                .map(|t| format!(", timeline: {}", escape_html(t)))
                .unwrap_or_default(),
        ));
    }

    html.push_str(&list("Key insights", &result.key_insights));
    html.push_str(&list("Risks", &result.risks));
    html
}

fn results(result: &EvaluationResult) -> String {
    let mut html = String::from("<section id=\"results\">\n");
    html.push_str(&overview(result));
    html.push_str("<h2>Evaluations</h2>\n");

    for response in &result.responses {
        match &response.error {
            None => html.push_str(&format!(
                "<div class=\"agent-result\" id=\"agent-{id}\"><h3>{name}{score}</h3><pre>{text}</pre></div>\n",
                id = escape_html(&response.agent_id),
                name = escape_html(&response.display_name),
                score = response
                    .scores
                    .as_ref()
                    .map(|s| format!(" <span class=\"hint\">{}</span>", percent(s.overall())))
                    .unwrap_or_default(),
                text = escape_html(response.text.trim()),
            )),
            Some(err) => html.push_str(&format!(
                "<div class=\"agent-result failed\" id=\"agent-{id}\"><h3>{name}</h3><p class=\"error\">{err}</p></div>\n",
                id = escape_html(&response.agent_id),
                name = escape_html(&response.display_name),
                err = escape_html(err),
            )),
        }
    }

    match (&result.summary, &result.summary_error) {
        (Some(summary), _) => html.push_str(&format!(
            "<h2>Summary</h2>\n<div class=\"summary\"><pre>{}</pre></div>\n",
            escape_html(summary.trim())
        )),
        (None, Some(err)) => html.push_str(&format!(
            "<h2>Summary</h2>\n<p class=\"error\">Summary unavailable: {}</p>\n",
            escape_html(err)
        )),
        (None, None) => {}
    }

    if result.usage.total() > 0 {
        html.push_str(&format!(
            "<p class=\"hint\">{} input + {} output tokens</p>\n",
            result.usage.input_tokens, result.usage.output_tokens
        ));
    }

    html.push_str("</section>\n");
    html
}

/// The whole page: form, then an error or results when present.
pub(super) fn page(
    agents: &[Agent],
    backend_label: &str,
    values: &FormValues,
    result: Option<&EvaluationResult>,
    error: Option<&str>,
) -> String {
    let error_html = error
        .map(|e| format!("<p class=\"error\">{}</p>\n", escape_html(e)))
        .unwrap_or_default();
    let results_html = result.map(results).unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Council · product idea evaluator</title>
<style>{style}</style>
</head>
<body>
<h1>Council</h1>
<p class="hint">Put a product idea in front of a panel of AI personas.</p>
{error_html}{form}
{results_html}<footer>backend: {backend}</footer>
</body>
</html>
"#,
        style = STYLE,
        error_html = error_html,
        form = form(agents, values),
        results_html = results_html,
        backend = escape_html(backend_label),
    )
}
