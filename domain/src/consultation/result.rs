//! The consultation result aggregate (spec §3).
//!
//! Grounded on `orchestration::value_objects::QuorumResult`'s
//! aggregate-result pattern in the teacher, expanded from a three-phase
//! result to the full four-artifact shape plus cost, pulse, and
//! substitution accounting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::options::Mode;
use crate::agent::{AgentDescriptor, AgentId, ProviderId};
use crate::artifact::{CrossExamArtifact, IndependentArtifact, SynthesisArtifact, VerdictArtifact};
use crate::cost::{CostEstimate, TokenUsage};
use crate::core::question::Question;
use crate::provider::ProviderError;

/// Terminal resting state of a consultation (I1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationState {
    Complete,
    Aborted,
    TimedOut,
    CostRejected,
    AllAgentsFailed,
}

/// The four rounds' artifacts, present according to how far the
/// consultation progressed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundResponses {
    pub round1: Vec<IndependentArtifact>,
    pub round2: Option<SynthesisArtifact>,
    pub round3: Option<CrossExamArtifact>,
    pub round4: Option<VerdictArtifact>,
}

/// A single agent's dispatch outcome, whether it came from the primary,
/// the hedged backup, or a user-chosen substitute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponseSummary {
    pub agent_id: AgentId,
    pub provider_id: ProviderId,
    pub success: bool,
    pub latency_ms: Option<u64>,
    pub provider_error: Option<ProviderError>,
    pub was_substituted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostAccounting {
    pub estimated: CostEstimate,
    pub actual: CostEstimate,
}

/// One per-agent pulse trigger (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseEvent {
    pub agent_id: AgentId,
    pub elapsed_seconds: u64,
    pub user_cancelled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseMetadata {
    pub pulse_triggered: bool,
    pub events: Vec<PulseEvent>,
    pub user_cancelled_via_pulse: bool,
}

impl PulseMetadata {
    pub fn record(&mut self, event: PulseEvent) {
        self.pulse_triggered = true;
        self.user_cancelled_via_pulse |= event.user_cancelled;
        self.events.push(event);
    }
}

/// Tokens actually sent vs tokens that would have been sent without
/// filtering, for observability of the filter's effectiveness.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenEfficiencyStats {
    pub raw_tokens: u64,
    pub filtered_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationResult {
    pub consultation_id: String,
    pub question: Question,
    pub mode: Mode,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub state: ConsultationState,
    pub responses: RoundResponses,
    pub recommendation: Option<String>,
    pub confidence: Option<f64>,
    pub dissent: Vec<String>,
    pub cost: CostAccounting,
    pub tokens: TokenUsage,
    pub agents: Vec<AgentDescriptor>,
    pub agent_responses: Vec<AgentResponseSummary>,
    pub project_context: Option<String>,
    pub token_efficiency_stats: Option<TokenEfficiencyStats>,
    pub pulse_metadata: PulseMetadata,
}

impl ConsultationResult {
    /// I1: `state = complete` implies all four round artifacts are present.
    pub fn satisfies_completeness_invariant(&self) -> bool {
        if self.state != ConsultationState::Complete {
            return true;
        }
        !self.responses.round1.is_empty()
            && self.responses.round2.is_some()
            && self.responses.round3.is_some()
            && self.responses.round4.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::new("Should we ship?")
    }

    fn base_result(state: ConsultationState) -> ConsultationResult {
        ConsultationResult {
            consultation_id: "01HZY".into(),
            question: question(),
            mode: Mode::Consult,
            timestamp: DateTime::from_timestamp(0, 0).unwrap(),
            duration_ms: 0,
            state,
            responses: RoundResponses::default(),
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
    fn complete_without_all_artifacts_violates_invariant() {
        let result = base_result(ConsultationState::Complete);
        assert!(!result.satisfies_completeness_invariant());
    }

    #[test]
    fn non_complete_states_are_exempt_from_the_invariant() {
        let result = base_result(ConsultationState::CostRejected);
        assert!(result.satisfies_completeness_invariant());
    }

    #[test]
    fn pulse_metadata_records_cancellation() {
        let mut pulse = PulseMetadata::default();
        pulse.record(PulseEvent {
            agent_id: AgentId::new("a3"),
            elapsed_seconds: 65,
            user_cancelled: true,
        });
        assert!(pulse.pulse_triggered);
        assert!(pulse.user_cancelled_via_pulse);
    }
}
