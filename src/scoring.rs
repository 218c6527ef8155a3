//! Numeric scores and the advisor verdict, read from fenced JSON blocks at
//! the end of model answers.
//!
//! Each agent is asked to close with a block like
//!
//! ```json
//! {"market_potential": 0.8, "technical_feasibility": 0.6, "innovation_potential": 0.7,
//!  "key_insights": ["..."], "risks": ["..."]}
//! ```
//!
//! Anything that does not parse, or carries a score outside `0..=1`, is
//! dropped: the answer still counts, it just has no scores.

use serde::{Deserialize, Serialize};

use crate::engine::AgentResponse;

/// One agent's scores, each in `0..=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentScores {
    pub market_potential: f64,
    pub technical_feasibility: f64,
    pub innovation_potential: f64,
    #[serde(default)]
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
}

impl AgentScores {
    pub fn overall(&self) -> f64 {
        (self.market_potential + self.technical_feasibility + self.innovation_potential) / 3.0
    }

    fn in_range(&self) -> bool {
        [
            self.market_potential,
            self.technical_feasibility,
            self.innovation_potential,
        ]
        .iter()
        .all(|s| (0.0..=1.0).contains(s))
    }
}

/// Scores averaged over every agent that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelScores {
    pub overall: f64,
    pub market_potential: f64,
    pub technical_feasibility: f64,
    pub innovation_potential: f64,
    /// How many agents contributed scores.
    pub scored_agents: usize,
}

/// The advisor's call on whether to pursue the idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub pursue: bool,
    /// Confidence in the call, `0..=1`.
    pub confidence: f64,
    #[serde(default)]
    pub timeline: Option<String>,
}

/// The last ```` ```json ```` fenced block in `text`.
fn last_json_block(text: &str) -> Option<&str> {
    let start = text.rfind("```json")?;
    let body = &text[start + "```json".len()..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// Read an agent's scores from the end of its answer.
pub fn parse_scores(text: &str) -> Option<AgentScores> {
    let block = last_json_block(text)?;
    let scores: AgentScores = serde_json::from_str(block).ok()?;
    scores.in_range().then_some(scores)
}

/// Read the advisor verdict from the end of the summary.
pub fn parse_verdict(text: &str) -> Option<Verdict> {
    let block = last_json_block(text)?;
    let verdict: Verdict = serde_json::from_str(block).ok()?;
    (0.0..=1.0)
        .contains(&verdict.confidence)
        .then_some(verdict)
}

/// Average the scores of successful responses, or `None` if none had any.
pub fn aggregate(responses: &[AgentResponse]) -> Option<PanelScores> {
    let scored: Vec<&AgentScores> = responses
        .iter()
        .filter(|r| r.is_ok())
        .filter_map(|r| r.scores.as_ref())
        .collect();
    if scored.is_empty() {
        return None;
    }

    let n = scored.len() as f64;
    let mean = |f: fn(&AgentScores) -> f64| scored.iter().map(|s| f(s)).sum::<f64>() / n;
    let market_potential = mean(|s| s.market_potential);
    let technical_feasibility = mean(|s| s.technical_feasibility);
    let innovation_potential = mean(|s| s.innovation_potential);

    Some(PanelScores {
        overall: (market_potential + technical_feasibility + innovation_potential) / 3.0,
        market_potential,
        technical_feasibility,
        innovation_potential,
        scored_agents: scored.len(),
    })
}

/// Key insights and risks across the panel, in roster order, without repeats.
pub fn collect_findings(responses: &[AgentResponse]) -> (Vec<String>, Vec<String>) {
    let mut insights: Vec<String> = Vec::new();
    let mut risks: Vec<String> = Vec::new();
    for scores in responses.iter().filter_map(|r| r.scores.as_ref()) {
        for insight in &scores.key_insights {
            if !insights.contains(insight) {
                insights.push(insight.clone());
            }
        }
        for risk in &scores.risks {
            if !risks.contains(risk) {
                risks.push(risk.clone());
            }
        }
    }
    (insights, risks)
}

/// Render a `0..=1` score as a percentage, e.g. `72%`.
pub fn percent(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(block: &str) -> String {
        format!("Verdict: promising.\nRisks: hardware.\n\n```json\n{block}\n```\n")
    }

    fn response(scores: Option<AgentScores>, error: Option<&str>) -> AgentResponse {
        AgentResponse {
            agent_id: "a".to_string(),
            display_name: "A".to_string(),
            text: String::new(),
            error: error.map(str::to_string),
            usage: None,
            scores,
        }
    }

    fn scores(m: f64, t: f64, i: f64) -> AgentScores {
        AgentScores {
            market_potential: m,
            technical_feasibility: t,
            innovation_potential: i,
            key_insights: Vec::new(),
            risks: Vec::new(),
        }
    }

    #[test]
    fn parses_trailing_block() {
        let text = answer(
            r#"{"market_potential": 0.8, "technical_feasibility": 0.5, "innovation_potential": 0.2,
                "key_insights": ["big market"], "risks": ["supply chain"]}"#,
        );
        let parsed = parse_scores(&text).unwrap();
        assert_eq!(parsed.market_potential, 0.8);
        assert_eq!(parsed.key_insights, vec!["big market"]);
        assert_eq!(parsed.risks, vec!["supply chain"]);
        assert!((parsed.overall() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn lists_are_optional() {
        let text = answer(
            r#"{"market_potential": 1, "technical_feasibility": 0, "innovation_potential": 0.5}"#,
        );
        let parsed = parse_scores(&text).unwrap();
        assert!(parsed.key_insights.is_empty());
    }

    #[test]
    fn last_block_wins() {
        let text = format!(
            "{}{}",
            answer(r#"{"market_potential": 0.1, "technical_feasibility": 0.1, "innovation_potential": 0.1}"#),
            answer(r#"{"market_potential": 0.9, "technical_feasibility": 0.9, "innovation_potential": 0.9}"#),
        );
        assert_eq!(parse_scores(&text).unwrap().market_potential, 0.9);
    }

    #[test]
    fn unusable_blocks_yield_none() {
        assert!(parse_scores("no block at all").is_none());
        assert!(parse_scores("```json\n{\"market_potential\": 0.5}\n```").is_none());
        assert!(parse_scores("```json\nnot json\n```").is_none());
        assert!(parse_scores("```json\n{\"market_potential\": 0.5").is_none());
        let out_of_range = answer(
            r#"{"market_potential": 8, "technical_feasibility": 0.5, "innovation_potential": 0.5}"#,
        );
        assert!(parse_scores(&out_of_range).is_none());
    }

    #[test]
    fn placeholder_template_does_not_parse() {
        let template = "```json\n{\"market_potential\": <0-1>}\n```";
        assert!(parse_scores(template).is_none());
    }

    #[test]
    fn verdict_parses_and_checks_confidence() {
        let text = "Pursue it.\n```json\n{\"pursue\": true, \"confidence\": 0.75, \"timeline\": \"9 months\"}\n```";
        let verdict = parse_verdict(text).unwrap();
        assert!(verdict.pursue);
        assert_eq!(verdict.confidence, 0.75);
        assert_eq!(verdict.timeline.as_deref(), Some("9 months"));

        assert!(parse_verdict("```json\n{\"pursue\": false, \"confidence\": 3}\n```").is_none());
        assert!(parse_verdict("Pursue it.").is_none());
    }

    #[test]
    fn aggregate_averages_scored_successes_only() {
        let responses = vec![
            response(Some(scores(1.0, 0.5, 0.0)), None),
            response(Some(scores(0.0, 0.5, 1.0)), None),
            response(None, None),
            response(Some(scores(0.0, 0.0, 0.0)), Some("down")),
        ];
        let panel = aggregate(&responses).unwrap();
        assert_eq!(panel.scored_agents, 2);
        assert_eq!(panel.market_potential, 0.5);
        assert_eq!(panel.technical_feasibility, 0.5);
        assert_eq!(panel.innovation_potential, 0.5);
        assert_eq!(panel.overall, 0.5);
    }

    #[test]
    fn aggregate_without_scores_is_none() {
        assert!(aggregate(&[response(None, None)]).is_none());
        assert!(aggregate(&[]).is_none());
    }

    #[test]
    fn findings_are_deduplicated_in_order() {
        let mut first = scores(0.5, 0.5, 0.5);
        first.key_insights = vec!["timing".to_string(), "moat".to_string()];
        first.risks = vec!["cost".to_string()];
        let mut second = scores(0.5, 0.5, 0.5);
        second.key_insights = vec!["moat".to_string(), "team".to_string()];
        second.risks = vec!["cost".to_string(), "regulation".to_string()];

        let (insights, risks) =
            collect_findings(&[response(Some(first), None), response(Some(second), None)]);
        assert_eq!(insights, vec!["timing", "moat", "team"]);
        assert_eq!(risks, vec!["cost", "regulation"]);
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(percent(0.724), "72%");
        assert_eq!(percent(1.0), "100%");
    }
}
