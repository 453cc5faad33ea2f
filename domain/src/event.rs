//! Structured lifecycle events emitted by the debate core (spec §6).
//!
//! The event bus itself (topic-keyed fan-out, scoped per consultation)
//! lives in the application layer; this module only defines the payload
//! shapes so producers and listeners share one vocabulary.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, ProviderId};
use crate::artifact::{CrossExamArtifact, IndependentArtifact, SynthesisArtifact, VerdictArtifact};
use crate::consultation::ConsultationResult;
use crate::cost::CostEstimate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum Event {
    #[serde(rename = "consultation:started")]
    ConsultationStarted {
        consultation_id: String,
        question: String,
        agents: Vec<AgentId>,
    },
    #[serde(rename = "consultation:cost_estimated")]
    ConsultationCostEstimated {
        estimate: CostEstimate,
        proceed_required: bool,
    },
    #[serde(rename = "consultation:user_consent")]
    ConsultationUserConsent { accepted: bool },
    #[serde(rename = "agent:thinking")]
    AgentThinking {
        agent_id: AgentId,
        agent_name: String,
        round: u8,
    },
    #[serde(rename = "agent:completed")]
    AgentCompleted {
        agent_id: AgentId,
        agent_name: String,
        round: u8,
        success: bool,
        latency_ms: Option<u64>,
    },
    #[serde(rename = "round:start")]
    RoundStart { round: u8 },
    #[serde(rename = "round:completed")]
    RoundCompleted { round: u8, artifact_type: String },
    #[serde(rename = "consultation:round_artifact")]
    ConsultationRoundArtifact {
        round: u8,
        artifact: RoundArtifactPayload,
    },
    #[serde(rename = "consultation:provider_substituted")]
    ConsultationProviderSubstituted {
        agent_id: AgentId,
        original_provider: ProviderId,
        substitute_provider: ProviderId,
        reason: SubstitutionReason,
    },
    #[serde(rename = "health:check_started")]
    HealthCheckStarted { provider_id: ProviderId },
    #[serde(rename = "health:status_updated")]
    HealthStatusUpdated {
        provider: ProviderId,
        previous: String,
        new: String,
        reason: String,
    },
    #[serde(rename = "consultation:completed")]
    ConsultationCompleted { result: Box<ConsultationResult> },
    #[serde(rename = "error")]
    Error { message: String, context: String },
    #[serde(rename = "consultation:pulse_cancel")]
    ConsultationPulseCancel {
        agent_id: AgentId,
        elapsed_seconds: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundArtifactPayload {
    Independent(IndependentArtifact),
    Synthesis(SynthesisArtifact),
    CrossExam(CrossExamArtifact),
    Verdict(VerdictArtifact),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionReason {
    Timeout,
    Failure,
}

impl Event {
    /// The topic string used for subscription matching.
    pub fn topic(&self) -> &'static str {
        match self {
            Event::ConsultationStarted { .. } => "consultation:started",
            Event::ConsultationCostEstimated { .. } => "consultation:cost_estimated",
            Event::ConsultationUserConsent { .. } => "consultation:user_consent",
            Event::AgentThinking { .. } => "agent:thinking",
            Event::AgentCompleted { .. } => "agent:completed",
            Event::RoundStart { .. } => "round:start",
            Event::RoundCompleted { .. } => "round:completed",
            Event::ConsultationRoundArtifact { .. } => "consultation:round_artifact",
            Event::ConsultationProviderSubstituted { .. } => "consultation:provider_substituted",
            Event::HealthCheckStarted { .. } => "health:check_started",
            Event::HealthStatusUpdated { .. } => "health:status_updated",
            Event::ConsultationCompleted { .. } => "consultation:completed",
            Event::Error { .. } => "error",
            Event::ConsultationPulseCancel { .. } => "consultation:pulse_cancel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_matches_agent_thinking() {
        let event = Event::AgentThinking {
            agent_id: AgentId::new("a1"),
            agent_name: "Advisor One".into(),
            round: 1,
        };
        assert_eq!(event.topic(), "agent:thinking");
    }
}
