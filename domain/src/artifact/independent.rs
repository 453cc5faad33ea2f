//! Round-1 (independent) artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ArtifactKind, clamp_confidence};
use crate::agent::AgentId;

/// One advisor's independent answer, produced before any cross-agent
/// exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndependentArtifact {
    pub artifact_type: ArtifactKind,
    pub agent_id: AgentId,
    /// Position in the agent configuration order (not completion order).
    pub position: usize,
    pub key_points: Vec<String>,
    pub rationale: String,
    pub confidence: f64,
    pub prose_excerpt: String,
    pub created_at: DateTime<Utc>,
}

impl IndependentArtifact {
    pub fn new(
        agent_id: AgentId,
        position: usize,
        key_points: Vec<String>,
        rationale: impl Into<String>,
        confidence: f64,
        prose_excerpt: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            artifact_type: ArtifactKind::Independent,
            agent_id,
            position,
            key_points,
            rationale: rationale.into(),
            confidence: clamp_confidence(confidence),
            prose_excerpt: prose_excerpt.into(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn confidence_above_one_is_clamped() {
        let artifact = IndependentArtifact::new(
            AgentId::new("a1"),
            0,
            vec!["point".into()],
            "because",
            1.4,
            "excerpt",
            now(),
        );
        assert_eq!(artifact.confidence, 1.0);
    }

    #[test]
    fn negative_confidence_is_clamped() {
        let artifact = IndependentArtifact::new(
            AgentId::new("a1"),
            0,
            vec![],
            "because",
            -0.2,
            "excerpt",
            now(),
        );
        assert_eq!(artifact.confidence, 0.0);
    }

    #[test]
    fn serializes_with_snake_case_artifact_type() {
        let artifact =
            IndependentArtifact::new(AgentId::new("a1"), 0, vec![], "r", 0.5, "e", now());
        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("\"artifact_type\":\"independent\""));
    }
}
