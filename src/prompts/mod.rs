use crate::agents::Agent;
use crate::backend::Prompt;
use crate::engine::{AgentResponse, EvaluationRequest};

const ANSWER_HEADER: &str = "Structure your answer as:";
const ANSWER_SECTIONS: &[&str] = &[
    "Verdict: one sentence on whether the idea is worth pursuing.",
    "Strengths: the most compelling aspects.",
    "Risks: the biggest obstacles or unknowns.",
    "Recommendation: the single next step you would take.",
];

const SCORES_INSTRUCTION: &str = "Finish with your scores as a fenced JSON block, each score \
between 0 and 1:\n\
```json\n\
{\"market_potential\": <0-1>, \"technical_feasibility\": <0-1>, \"innovation_potential\": <0-1>, \
\"key_insights\": [\"...\"], \"risks\": [\"...\"]}\n\
```";

const VERDICT_INSTRUCTION: &str = "Finish with your call as a fenced JSON block:\n\
```json\n\
{\"pursue\": <true|false>, \"confidence\": <0-1>, \"timeline\": \"<rough time to launch>\"}\n\
```";

const ADVISOR_SYSTEM: &str = "You are an experienced project advisor with expertise in \
evaluating AI and technology projects. You receive independent evaluations of one product idea \
from several expert reviewers. Synthesize them into a single balanced assessment: where they \
agree, where they disagree, the key risks, and a clear recommendation on whether to pursue the \
project, with concrete next steps. Do not invent opinions for reviewers who did not respond.";

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn context_block(request: &EvaluationRequest) -> String {
    match request.context() {
        Some(context) => format!("\n\nAdditional context:\n{}", context),
        None => String::new(),
    }
}

/// The prompt one agent receives for a request.
pub fn build_agent_prompt(agent: &Agent, request: &EvaluationRequest) -> Prompt {
    let user = format!(
        "As {name}, evaluate this product idea: {idea}{context}\n\n{header}\n{sections}\n\n{scores}\n",
        name = agent.display_name,
        idea = request.idea_text.trim(),
        context = context_block(request),
        header = ANSWER_HEADER,
        sections = bullet_list(ANSWER_SECTIONS),
        scores = SCORES_INSTRUCTION,
    );

    Prompt::new(agent.prompt_template.clone(), user)
        .with_overrides(request.model(), request.temperature)
}

/// The synthesis prompt over the agents that answered.
///
/// Failed responses contribute only their name, never their error text.
pub fn build_summary_prompt(
    request: &EvaluationRequest,
    responses: &[AgentResponse],
) -> Prompt {
    let mut evaluations = String::new();
    let mut missing = Vec::new();

    for response in responses {
        if response.is_ok() {
            evaluations.push_str(&format!(
                "### {}\n{}\n\n",
                response.display_name,
                response.text.trim()
            ));
        } else {
            missing.push(response.display_name.as_str());
        }
    }

    let missing_note = if missing.is_empty() {
        String::new()
    } else {
        format!("Reviewers who did not respond: {}\n\n", missing.join(", "))
    };

    let user = format!(
        "Product idea: {idea}{context}\n\nExpert evaluations:\n\n{evaluations}{missing_note}\
         Provide the combined evaluation.\n\n{verdict}\n",
        idea = request.idea_text.trim(),
        context = context_block(request),
        evaluations = evaluations,
        missing_note = missing_note,
        verdict = VERDICT_INSTRUCTION,
    );

    Prompt::new(ADVISOR_SYSTEM, user).with_overrides(request.model(), request.temperature)
}
