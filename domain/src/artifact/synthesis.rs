//! Round-2 (synthesis) artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ArtifactKind;
use crate::agent::AgentId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConsensusPoint {
    pub point: String,
    pub supporting_agents: Vec<AgentId>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Viewpoint {
    pub agent: AgentId,
    pub viewpoint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Tension {
    pub topic: String,
    pub viewpoints: Vec<Viewpoint>,
}

/// The judge's consolidation of round 1: where advisors agree, where they
/// diverge, and a suggested priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SynthesisArtifact {
    pub artifact_type: ArtifactKind,
    pub round_number: u8,
    pub consensus_points: Vec<ConsensusPoint>,
    pub tensions: Vec<Tension>,
    pub priority_order: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl SynthesisArtifact {
    pub fn new(
        consensus_points: Vec<ConsensusPoint>,
        tensions: Vec<Tension>,
        priority_order: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            artifact_type: ArtifactKind::Synthesis,
            round_number: 2,
            consensus_points,
            tensions,
            priority_order,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_number_is_always_two() {
        let artifact =
            SynthesisArtifact::new(vec![], vec![], vec![], DateTime::from_timestamp(0, 0).unwrap());
        assert_eq!(artifact.round_number, 2);
    }
}
