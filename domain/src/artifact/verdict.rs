//! Round-4 (verdict) artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ArtifactKind, clamp_confidence};

/// The judge's final adjudicated recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerdictArtifact {
    pub artifact_type: ArtifactKind,
    pub round_number: u8,
    pub recommendation: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub dissent: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl VerdictArtifact {
    pub fn new(
        recommendation: impl Into<String>,
        confidence: f64,
        evidence: Vec<String>,
        dissent: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            artifact_type: ArtifactKind::Verdict,
            round_number: 4,
            recommendation: recommendation.into(),
            confidence: clamp_confidence(confidence),
            evidence,
            dissent,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_confidence() {
        let verdict = VerdictArtifact::new(
            "Ship it",
            2.5,
            vec![],
            vec![],
            DateTime::from_timestamp(0, 0).unwrap(),
        );
        assert_eq!(verdict.confidence, 1.0);
    }
}
