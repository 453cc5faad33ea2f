//! Round-to-round artifact filtering.
//!
//! A pure function: given the full upstream artifact, return a compact
//! version for the next round's prompt budget. Never allocates new facts,
//! only drops or reorders existing ones. When `verbose` is set, artifacts
//! pass through unchanged.

use super::cross_exam::CrossExamArtifact;
use super::synthesis::SynthesisArtifact;

/// Caps exposed as configuration (spec's open question on exact truncation
/// caps — resolved by making them configurable rather than hardcoded).
#[derive(Debug, Clone, Copy)]
pub struct ArtifactFilterConfig {
    pub max_consensus_points: usize,
    pub max_tensions: usize,
    pub max_challenges: usize,
    pub max_rebuttals: usize,
    pub verbose: bool,
}

impl Default for ArtifactFilterConfig {
    fn default() -> Self {
        Self {
            max_consensus_points: 8,
            max_tensions: 5,
            max_challenges: 8,
            max_rebuttals: 8,
            verbose: false,
        }
    }
}

/// Filter a synthesis artifact for consumption by round 3, preserving the
/// highest-confidence consensus points and the first `max_tensions`
/// tensions.
pub fn filter_synthesis(
    artifact: &SynthesisArtifact,
    config: &ArtifactFilterConfig,
) -> SynthesisArtifact {
    if config.verbose {
        return artifact.clone();
    }
    let mut consensus_points = artifact.consensus_points.clone();
    consensus_points.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    consensus_points.truncate(config.max_consensus_points);

    let mut tensions = artifact.tensions.clone();
    tensions.truncate(config.max_tensions);

    SynthesisArtifact {
        consensus_points,
        tensions,
        ..artifact.clone()
    }
}

/// Filter a cross-exam artifact for consumption by round 4: all
/// `unresolved` items are kept, `challenges` and `rebuttals` are capped.
pub fn filter_cross_exam(
    artifact: &CrossExamArtifact,
    config: &ArtifactFilterConfig,
) -> CrossExamArtifact {
    if config.verbose {
        return artifact.clone();
    }
    let mut challenges = artifact.challenges.clone();
    challenges.truncate(config.max_challenges);
    let mut rebuttals = artifact.rebuttals.clone();
    rebuttals.truncate(config.max_rebuttals);

    CrossExamArtifact {
        challenges,
        rebuttals,
        unresolved: artifact.unresolved.clone(),
        ..artifact.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::artifact::synthesis::ConsensusPoint;
    use chrono::DateTime;

    fn now() -> chrono::DateTime<chrono::Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    fn synthesis_with_points(n: usize) -> SynthesisArtifact {
        let points = (0..n)
            .map(|i| ConsensusPoint {
                point: format!("point {i}"),
                supporting_agents: vec![AgentId::new("a1")],
                confidence: (i as f64) / (n as f64),
            })
            .collect();
        SynthesisArtifact::new(points, vec![], vec![], now())
    }

    #[test]
    fn truncates_to_cap_keeping_highest_confidence() {
        let artifact = synthesis_with_points(10);
        let config = ArtifactFilterConfig {
            max_consensus_points: 3,
            ..Default::default()
        };
        let filtered = filter_synthesis(&artifact, &config);
        assert_eq!(filtered.consensus_points.len(), 3);
        assert_eq!(filtered.consensus_points[0].point, "point 9");
    }

    #[test]
    fn verbose_mode_bypasses_filtering() {
        let artifact = synthesis_with_points(10);
        let config = ArtifactFilterConfig {
            max_consensus_points: 3,
            verbose: true,
            ..Default::default()
        };
        let filtered = filter_synthesis(&artifact, &config);
        assert_eq!(filtered.consensus_points.len(), 10);
    }

    #[test]
    fn cross_exam_keeps_all_unresolved() {
        let artifact = CrossExamArtifact::new(
            vec![],
            vec![],
            vec!["topic a".into(), "topic b".into(), "topic c".into()],
            now(),
        );
        let config = ArtifactFilterConfig::default();
        let filtered = filter_cross_exam(&artifact, &config);
        assert_eq!(filtered.unresolved.len(), 3);
    }
}
