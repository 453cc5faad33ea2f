//! Provider health record, rolling result window, and the pure
//! classification algorithm.
//!
//! Grounded on the shape of generic backend health-check tooling (status +
//! rolling window + consecutive-failure counter) and on the teacher's
//! enum-with-`Display` style used for its own status enums.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of the rolling result window (I6).
pub const ROLLING_WINDOW_SIZE: usize = 10;

/// Consecutive-failure count at which a provider becomes Degraded.
pub const DEGRADED_FAILURE_THRESHOLD: u32 = 1;

/// Consecutive-failure count at which a provider becomes Unhealthy.
pub const UNHEALTHY_FAILURE_THRESHOLD: u32 = 3;

/// Latency below which a successful call classifies as Healthy.
pub const HEALTHY_LATENCY_MS: u64 = 3_000;

/// Latency at or above which a successful call classifies as Unhealthy.
pub const UNHEALTHY_LATENCY_MS: u64 = 10_000;

/// Classification of a provider's current fitness for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    /// No probe or real request has completed yet.
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Bounded sequence of at most [`ROLLING_WINDOW_SIZE`] outcomes (I6), most
/// recent last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollingWindow {
    results: VecDeque<bool>,
}

impl RollingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome, dropping the oldest entry on overflow.
    pub fn push(&mut self, success: bool) {
        if self.results.len() >= ROLLING_WINDOW_SIZE {
            self.results.pop_front();
        }
        self.results.push_back(success);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Fraction of `false` entries in the window; `0.0` when empty.
    pub fn error_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        let failures = self.results.iter().filter(|success| !**success).count();
        failures as f64 / self.results.len() as f64
    }
}

/// One health record per registered provider id (I5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub status: HealthStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub latency_ms: Option<u64>,
    #[serde(skip)]
    pub window: RollingWindow,
    pub consecutive_failures: u32,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self {
            status: HealthStatus::Unknown,
            last_checked: None,
            latency_ms: None,
            window: RollingWindow::new(),
            consecutive_failures: 0,
        }
    }
}

impl ProviderHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_rate(&self) -> f64 {
        self.window.error_rate()
    }

    /// Apply one real or synthetic result and return `(previous, new)`
    /// status so the caller can decide whether to emit
    /// `health:status_updated`.
    pub fn update(
        &mut self,
        success: bool,
        latency_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> (HealthStatus, HealthStatus) {
        let previous = self.status;

        self.window.push(success);
        self.last_checked = Some(now);
        self.latency_ms = latency_ms;

        if success {
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
        }

        self.status = classify(success, latency_ms, self.consecutive_failures);
        (previous, self.status)
    }
}

/// Pure classification algorithm (spec §4.2 step 3).
fn classify(success: bool, latency_ms: Option<u64>, consecutive_failures: u32) -> HealthStatus {
    if success {
        match latency_ms {
            Some(ms) if ms < HEALTHY_LATENCY_MS => HealthStatus::Healthy,
            Some(ms) if ms < UNHEALTHY_LATENCY_MS => HealthStatus::Degraded,
            _ => HealthStatus::Unhealthy,
        }
    } else if consecutive_failures >= UNHEALTHY_FAILURE_THRESHOLD {
        HealthStatus::Unhealthy
    } else if consecutive_failures >= DEGRADED_FAILURE_THRESHOLD {
        HealthStatus::Degraded
    } else {
        HealthStatus::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn rolling_window_caps_at_ten() {
        let mut window = RollingWindow::new();
        for _ in 0..15 {
            window.push(true);
        }
        assert_eq!(window.len(), ROLLING_WINDOW_SIZE);
    }

    #[test]
    fn rolling_window_error_rate() {
        let mut window = RollingWindow::new();
        window.push(true);
        window.push(false);
        window.push(false);
        window.push(true);
        assert_eq!(window.error_rate(), 0.5);
    }

    #[test]
    fn success_under_three_seconds_is_healthy() {
        let mut health = ProviderHealth::new();
        let (_, new) = health.update(true, Some(1_200), now());
        assert_eq!(new, HealthStatus::Healthy);
    }

    #[test]
    fn success_between_three_and_ten_seconds_is_degraded() {
        let mut health = ProviderHealth::new();
        let (_, new) = health.update(true, Some(5_000), now());
        assert_eq!(new, HealthStatus::Degraded);
    }

    #[test]
    fn success_at_or_over_ten_seconds_is_unhealthy() {
        let mut health = ProviderHealth::new();
        let (_, new) = health.update(true, Some(10_000), now());
        assert_eq!(new, HealthStatus::Unhealthy);
    }

    #[test]
    fn three_consecutive_failures_is_unhealthy() {
        let mut health = ProviderHealth::new();
        health.update(false, None, now());
        health.update(false, None, now());
        let (_, new) = health.update(false, None, now());
        assert_eq!(new, HealthStatus::Unhealthy);
        assert_eq!(health.consecutive_failures, 3);
    }

    #[test]
    fn one_or_two_consecutive_failures_is_degraded() {
        let mut health = ProviderHealth::new();
        let (_, new) = health.update(false, None, now());
        assert_eq!(new, HealthStatus::Degraded);
    }

    #[test]
    fn success_resets_consecutive_failures() {
        let mut health = ProviderHealth::new();
        health.update(false, None, now());
        health.update(false, None, now());
        health.update(true, Some(500), now());
        assert_eq!(health.consecutive_failures, 0);
    }

    #[test]
    fn update_is_idempotent_with_respect_to_classification() {
        let mut a = ProviderHealth::new();
        let mut b = ProviderHealth::new();
        for h in [&mut a, &mut b] {
            h.update(true, Some(1_000), now());
        }
        assert_eq!(a.status, b.status);
    }
}
