//! The panel of personas an idea is put in front of.

mod personas;

use serde::Serialize;

/// A named prompt configuration representing one evaluator's viewpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: String,
    pub display_name: String,
    /// One-line summary of the persona's evaluation lens.
    pub description: String,
    /// System prompt describing how this persona judges an idea.
    pub prompt_template: String,
}

/// All registered agents in their fixed order.
pub fn list_agents() -> Vec<Agent> {
    personas::PERSONAS
        .iter()
        .map(|p| Agent {
            id: p.id.to_string(),
            display_name: p.display_name.to_string(),
            description: p.description.to_string(),
            prompt_template: p.prompt_template.to_string(),
        })
        .collect()
}

pub fn find_agent(id: &str) -> Option<Agent> {
    list_agents().into_iter().find(|a| a.id == id)
}
