//! Tier map and backup candidate selection.
//!
//! Generalizes the routing-priority-chain idiom (explicit map lookup, then
//! fallback) into tier-based backup selection: within the tier chain for a
//! primary's tier, pick the first candidate that is not the primary and is
//! currently [`Healthy`](super::health::HealthStatus::Healthy).

use std::collections::HashMap;

use super::health::HealthStatus;
use crate::agent::ProviderId;

/// A cost/capability band used for backup selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Premium.
    T1,
    /// Standard.
    T2,
    /// Cheap.
    T3,
}

impl Tier {
    /// Tier chain tried in order when the primary provider is in this tier.
    ///
    /// T1 -> [T1, T2, T3], T2 -> [T2, T3], T3 -> [T3].
    pub fn backup_chain(self) -> &'static [Tier] {
        match self {
            Tier::T1 => &[Tier::T1, Tier::T2, Tier::T3],
            Tier::T2 => &[Tier::T2, Tier::T3],
            Tier::T3 => &[Tier::T3],
        }
    }
}

/// Static, read-only mapping from provider id to tier.
#[derive(Debug, Clone, Default)]
pub struct TierMap {
    tiers: HashMap<ProviderId, Tier>,
}

impl TierMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider_id: ProviderId, tier: Tier) -> &mut Self {
        self.tiers.insert(provider_id, tier);
        self
    }

    pub fn tier_of(&self, provider_id: &ProviderId) -> Option<Tier> {
        self.tiers.get(provider_id).copied()
    }

    /// Every provider id registered in the given tier, in insertion order
    /// is not preserved (`HashMap`); callers needing deterministic order
    /// should sort.
    pub fn providers_in_tier(&self, tier: Tier) -> Vec<&ProviderId> {
        self.tiers
            .iter()
            .filter(|(_, t)| **t == tier)
            .map(|(id, _)| id)
            .collect()
    }
}

/// Candidates considered for a hedge/failure backup, derived on demand.
pub struct BackupCandidates;

impl BackupCandidates {
    /// Select a backup provider for `primary`, given the tier map and a
    /// snapshot of current health statuses.
    ///
    /// Returns `None` if `primary` has no known tier, or no tier-chain
    /// member other than `primary` is currently healthy.
    pub fn select(
        tier_map: &TierMap,
        health: &HashMap<ProviderId, HealthStatus>,
        primary: &ProviderId,
    ) -> Option<ProviderId> {
        let primary_tier = tier_map.tier_of(primary)?;
        for tier in primary_tier.backup_chain() {
            let mut candidates = tier_map.providers_in_tier(*tier);
            candidates.sort();
            for candidate in candidates {
                if candidate == primary {
                    continue;
                }
                if health.get(candidate) == Some(&HealthStatus::Healthy) {
                    return Some(candidate.clone());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TierMap {
        let mut m = TierMap::new();
        m.insert(ProviderId::new("premium-a"), Tier::T1);
        m.insert(ProviderId::new("premium-b"), Tier::T1);
        m.insert(ProviderId::new("standard-a"), Tier::T2);
        m.insert(ProviderId::new("cheap-a"), Tier::T3);
        m
    }

    #[test]
    fn selects_healthy_peer_in_same_tier() {
        let tier_map = map();
        let mut health = HashMap::new();
        health.insert(ProviderId::new("premium-b"), HealthStatus::Healthy);
        let backup =
            BackupCandidates::select(&tier_map, &health, &ProviderId::new("premium-a")).unwrap();
        assert_eq!(backup, ProviderId::new("premium-b"));
    }

    #[test]
    fn falls_through_to_lower_tier_when_same_tier_unhealthy() {
        let tier_map = map();
        let mut health = HashMap::new();
        health.insert(ProviderId::new("premium-b"), HealthStatus::Unhealthy);
        health.insert(ProviderId::new("standard-a"), HealthStatus::Healthy);
        let backup =
            BackupCandidates::select(&tier_map, &health, &ProviderId::new("premium-a")).unwrap();
        assert_eq!(backup, ProviderId::new("standard-a"));
    }

    #[test]
    fn t3_primary_has_no_fallback_tier() {
        let tier_map = map();
        let health = HashMap::new();
        assert!(BackupCandidates::select(&tier_map, &health, &ProviderId::new("cheap-a")).is_none());
    }

    #[test]
    fn never_selects_the_primary_itself() {
        let mut tier_map = TierMap::new();
        tier_map.insert(ProviderId::new("solo"), Tier::T1);
        let mut health = HashMap::new();
        health.insert(ProviderId::new("solo"), HealthStatus::Healthy);
        assert!(BackupCandidates::select(&tier_map, &health, &ProviderId::new("solo")).is_none());
    }

    #[test]
    fn unknown_primary_tier_yields_no_backup() {
        let tier_map = map();
        let health = HashMap::new();
        assert!(
            BackupCandidates::select(&tier_map, &health, &ProviderId::new("mystery")).is_none()
        );
    }
}
