//! Startup banner and evaluation printouts for the terminal.

use crate::agents::Agent;
use crate::backend::TokenUsage;
use crate::consts::{AUTHOR, HOMEPAGE, REPO, format_number};
use crate::engine::EvaluationResult;
use crate::scoring::percent;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub temperature: f32,
    pub agents: &'a [Agent],
    pub summary: bool,
    pub selection_db: &'a str,
    /// Listening address when serving, `None` for one-shot runs.
    pub address: Option<&'a str>,
}

pub fn render_banner(info: &BannerInfo) -> String {
    let panel = info
        .agents
        .iter()
        .map(|a| a.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut banner = format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║            C O U N C I L              ║
   ║   a panel of minds for your ideas     ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   provider  {} ({}, temperature {})
   panel     {} agent(s): {}
   summary   {}
   selection {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.provider,
        info.model,
        info.temperature,
        info.agents.len(),
        panel,
        if info.summary { "on" } else { "off" },
        info.selection_db,
    );

    if let Some(address) = info.address {
        banner.push_str(&format!("   listen    http://{}\n", address));
    }
    banner
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}

/// Plain-text rendering of a finished evaluation.
pub fn render_result(result: &EvaluationResult) -> String {
    let mut out = String::new();

    for response in &result.responses {
        out.push_str(&format!("\n── {} ──\n", response.display_name));
        match &response.error {
            None => out.push_str(response.text.trim()),
            Some(err) => out.push_str(&format!("✗ {}", err)),
        }
        out.push('\n');
    }

    match (&result.summary, &result.summary_error) {
        (Some(summary), _) => {
            out.push_str("\n══ Summary ══\n");
            out.push_str(summary.trim());
            out.push('\n');
        }
        (None, Some(err)) => out.push_str(&format!("\n✗ summary failed: {}\n", err)),
        (None, None) => {}
    }

    out.push_str(&render_scores(result));
    out
}

/// The numeric overview: averaged scores, verdict, insights and risks.
fn render_scores(result: &EvaluationResult) -> String {
    let mut out = String::new();

    if let Some(scores) = &result.scores {
        out.push_str(&format!(
            "\n══ Scores ({} agent(s)) ══\n",
            scores.scored_agents
        ));
        for (label, score) in [
            ("overall", scores.overall),
            ("market", scores.market_potential),
            ("technical", scores.technical_feasibility),
            ("innovation", scores.innovation_potential),
        ] {
            out.push_str(&format!("  {:<11} {:>4}\n", label, percent(score)));
        }
    }

    if let Some(verdict) = &result.verdict {
        out.push_str(&format!(
            "\n{} {} ({} confidence)",
            if verdict.pursue { "✓" } else { "✗" },
            if verdict.pursue { "pursue" } else { "do not pursue" },
            percent(verdict.confidence)
        ));
        if let Some(timeline) = &verdict.timeline {
            out.push_str(&format!(", timeline: {}", timeline));
        }
        out.push('\n');
    }

    for (title, items) in [("Key insights", &result.key_insights), ("Risks", &result.risks)] {
        if !items.is_empty() {
            out.push_str(&format!("\n{}:\n", title));
            for item in items {
                out.push_str(&format!("  • {}\n", item));
            }
        }
    }

    out
}

/// Token usage line, or `None` when nothing was counted.
pub fn usage_line(usage: TokenUsage) -> Option<String> {
    if usage.total() == 0 {
        return None;
    }
    Some(format!(
        "usage: {:>6} input + {:>6} output = {:>6} tokens",
        format_number(usage.input_tokens),
        format_number(usage.output_tokens),
        format_number(usage.total()),
    ))
}
