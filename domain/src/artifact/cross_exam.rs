//! Round-3 (cross-examination) artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ArtifactKind;
use crate::agent::AgentId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Challenge {
    pub challenger: AgentId,
    /// References an agent id present in round 1 (I3).
    pub target_agent: AgentId,
    pub challenge: String,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rebuttal {
    pub agent: AgentId,
    pub rebuttal: String,
}

/// The judge's consolidation of the agents' mutual challenges and
/// rebuttals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CrossExamArtifact {
    pub artifact_type: ArtifactKind,
    pub round_number: u8,
    pub challenges: Vec<Challenge>,
    pub rebuttals: Vec<Rebuttal>,
    pub unresolved: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl CrossExamArtifact {
    pub fn new(
        challenges: Vec<Challenge>,
        rebuttals: Vec<Rebuttal>,
        unresolved: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            artifact_type: ArtifactKind::CrossExam,
            round_number: 3,
            challenges,
            rebuttals,
            unresolved,
            created_at,
        }
    }

    /// I3: every challenge's target agent must appear in `round1_agents`.
    pub fn targets_are_valid(&self, round1_agents: &[AgentId]) -> bool {
        self.challenges
            .iter()
            .all(|c| round1_agents.contains(&c.target_agent))
    }
}
