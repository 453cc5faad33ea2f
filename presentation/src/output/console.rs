//! Console output formatter for consultation results.
//!
//! Grounded on the teacher's `ConsoleFormatter`: same
//! header/section_header/footer scaffolding and `colored::Colorize` usage,
//! generalized from `QuorumResult`'s three-phase shape to
//! [`ConsultationResult`]'s four-round artifact set.

use colored::Colorize;
use conclave_domain::consultation::{ConsultationResult, ConsultationState};

use crate::output::formatter::OutputFormatter;

/// Formats consultation results for console display.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format every round's artifacts plus the verdict.
    pub fn format(result: &ConsultationResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Conclave Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            result.question
        ));

        output.push_str(&format!(
            "{} {}\n\n",
            "State:".cyan().bold(),
            Self::state_label(result.state)
        ));

        if !result.responses.round1.is_empty() {
            output.push_str(&Self::section_header("Round 1: Independent Answers"));
            for artifact in &result.responses.round1 {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} (confidence {:.2}) ──", artifact.agent_id, artifact.confidence)
                        .yellow()
                        .bold(),
                    artifact.rationale
                ));
                for point in &artifact.key_points {
                    output.push_str(&format!("  * {}\n", point));
                }
            }
        }

        if let Some(synthesis) = &result.responses.round2 {
            output.push_str(&Self::section_header("Round 2: Synthesis"));
            if !synthesis.consensus_points.is_empty() {
                output.push_str(&format!("\n{}\n", "Consensus:".green().bold()));
                for point in &synthesis.consensus_points {
                    let agents = point
                        .supporting_agents
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    output.push_str(&format!(
                        "  * {} (confidence {:.2}, supported by {})\n",
                        point.point, point.confidence, agents
                    ));
                }
            }
            if !synthesis.tensions.is_empty() {
                output.push_str(&format!("\n{}\n", "Tensions:".yellow().bold()));
                for tension in &synthesis.tensions {
                    output.push_str(&format!("  * {}\n", tension.topic));
                    for viewpoint in &tension.viewpoints {
                        output.push_str(&format!(
                            "      {}: {}\n",
                            viewpoint.agent, viewpoint.viewpoint
                        ));
                    }
                }
            }
            if !synthesis.priority_order.is_empty() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    "Priority order:".cyan().bold(),
                    synthesis.priority_order.join(" > ")
                ));
            }
        }

        if let Some(cross_exam) = &result.responses.round3 {
            output.push_str(&Self::section_header("Round 3: Cross-Examination"));
            for challenge in &cross_exam.challenges {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} challenges {} ──", challenge.challenger, challenge.target_agent)
                        .yellow()
                        .bold(),
                    challenge.challenge
                ));
                for item in &challenge.evidence {
                    output.push_str(&format!("  * {}\n", item));
                }
            }
            for rebuttal in &cross_exam.rebuttals {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} rebuts ──", rebuttal.agent).yellow().bold(),
                    rebuttal.rebuttal
                ));
            }
            if !cross_exam.unresolved.is_empty() {
                output.push_str(&format!("\n{}\n", "Unresolved:".red().bold()));
                for item in &cross_exam.unresolved {
                    output.push_str(&format!("  * {}\n", item));
                }
            }
        }

        output.push_str(&Self::section_header("Round 4: Verdict"));
        if let Some(verdict) = &result.responses.round4 {
            output.push_str(&format!(
                "\n{}\n\n{}\n",
                format!("Confidence: {:.2}", verdict.confidence).yellow().bold(),
                verdict.recommendation
            ));
            if !verdict.evidence.is_empty() {
                output.push_str(&format!("\n{}\n", "Evidence:".cyan().bold()));
                for item in &verdict.evidence {
                    output.push_str(&format!("  * {}\n", item));
                }
            }
            if !verdict.dissent.is_empty() {
                output.push_str(&format!("\n{}\n", "Dissent:".red().bold()));
                for item in &verdict.dissent {
                    output.push_str(&format!("  * {}\n", item));
                }
            }
        } else if let Some(recommendation) = &result.recommendation {
            output.push_str(&format!("\n{}\n", recommendation));
        } else {
            output.push_str(&format!("\n{}\n", "No verdict was reached.".dimmed()));
        }

        output.push_str(&format!(
            "\n{} ${:.4} estimated, ${:.4} actual over {} tokens\n",
            "Cost:".cyan().bold(),
            result.cost.estimated.usd,
            result.cost.actual.usd,
            result.tokens.total
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format as pretty-printed JSON.
    pub fn format_json(result: &ConsultationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format only the final recommendation, confidence, and dissent.
    pub fn format_verdict_only(result: &ConsultationResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n\n", "=== Conclave Verdict ===".cyan().bold()));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), result.question));

        match (&result.recommendation, result.confidence) {
            (Some(recommendation), Some(confidence)) => {
                output.push_str(&format!(
                    "{}\n\n{} {:.2}\n",
                    recommendation,
                    "Confidence:".dimmed(),
                    confidence
                ));
            }
            _ => {
                output.push_str(&format!(
                    "{}\n",
                    Self::state_label(result.state).dimmed()
                ));
            }
        }

        if !result.dissent.is_empty() {
            output.push_str(&format!("\n{}\n", "Dissent:".red().bold()));
            for item in &result.dissent {
                output.push_str(&format!("  * {}\n", item));
            }
        }

        output
    }

    fn state_label(state: ConsultationState) -> &'static str {
        match state {
            ConsultationState::Complete => "complete",
            ConsultationState::Aborted => "aborted",
            ConsultationState::TimedOut => "timed out",
            ConsultationState::CostRejected => "cost rejected",
            ConsultationState::AllAgentsFailed => "all agents failed",
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string.
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &ConsultationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &ConsultationResult) -> String {
        Self::format_json(result)
    }

    fn format_verdict_only(&self, result: &ConsultationResult) -> String {
        Self::format_verdict_only(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use conclave_domain::agent::AgentId;
    use conclave_domain::artifact::IndependentArtifact;
    use conclave_domain::consultation::options::Mode;
    use conclave_domain::consultation::result::{CostAccounting, PulseMetadata, RoundResponses};
    use conclave_domain::core::question::Question;
    use conclave_domain::cost::TokenUsage;

    fn sample_result(state: ConsultationState) -> ConsultationResult {
        ConsultationResult {
            consultation_id: "01HZY".into(),
            question: Question::new("Should we ship?"),
            mode: Mode::Consult,
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            duration_ms: 120,
            state,
            responses: RoundResponses {
                round1: vec![IndependentArtifact::new(
                    AgentId::new("a1"),
                    0,
                    vec!["ship it".into()],
                    "the risk is low",
                    0.8,
                    "excerpt",
                    DateTime::from_timestamp(0, 0).unwrap(),
                )],
                round2: None,
                round3: None,
                round4: None,
            },
            recommendation: None,
            confidence: None,
            dissent: vec![],
            cost: CostAccounting::default(),
            tokens: TokenUsage::default(),
            agents: vec![],
            agent_responses: vec![],
            project_context: None,
            token_efficiency_stats: None,
            pulse_metadata: PulseMetadata::default(),
        }
    }

    #[test]
    fn format_includes_round1_key_points() {
        let result = sample_result(ConsultationState::Aborted);
        let text = ConsoleFormatter::format(&result);
        assert!(text.contains("ship it"));
        assert!(text.contains("Round 1: Independent Answers"));
    }

    #[test]
    fn format_without_verdict_falls_back_to_state_label() {
        let result = sample_result(ConsultationState::CostRejected);
        let text = ConsoleFormatter::format(&result);
        assert!(text.contains("cost rejected"));
    }

    #[test]
    fn format_json_round_trips_question() {
        let result = sample_result(ConsultationState::Aborted);
        let json = ConsoleFormatter::format_json(&result);
        assert!(json.contains("Should we ship?"));
    }

    #[test]
    fn verdict_only_reports_dissent() {
        let mut result = sample_result(ConsultationState::Complete);
        result.recommendation = Some("Ship it".into());
        result.confidence = Some(0.9);
        result.dissent = vec!["agent a2 disagreed".into()];
        let text = ConsoleFormatter::format_verdict_only(&result);
        assert!(text.contains("Ship it"));
        assert!(text.contains("agent a2 disagreed"));
    }
}
