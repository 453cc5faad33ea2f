//! Interactive prompt port: cost consent, hedge total-failure recovery, and
//! pulse watchdog continuation.
//!
//! Grounded on `application/src/ports/human_intervention.rs`'s port +
//! auto-approve/-reject built-ins pattern in the teacher. Non-interactive
//! policy must be explicit per spec's design note — there is no "default"
//! implementation here, callers must choose
//! [`AutoAcceptPolicy`]/[`AutoRejectPolicy`] deliberately.

use async_trait::async_trait;
use conclave_domain::agent::AgentId;
use conclave_domain::cost::CostEstimate;

/// The three choices offered on the hedged manager's total-failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeRecoveryChoice {
    Substitute,
    Skip,
    Abort,
}

#[async_trait]
pub trait InteractionPort: Send + Sync {
    /// Cost Gate consent prompt. Returns `true` to proceed.
    async fn confirm_cost(&self, estimate: &CostEstimate, threshold_usd: f64) -> bool;

    /// Hedged Request Manager's total-failure recovery prompt.
    async fn choose_hedge_recovery(&self, agent_id: &AgentId) -> HedgeRecoveryChoice;

    /// Pulse watchdog's "continue waiting?" prompt. Returns `true` to keep
    /// waiting.
    async fn confirm_continue_waiting(&self, agent_id: &AgentId, elapsed_seconds: u64) -> bool;
}

/// Explicit non-interactive policy: accepts cost, substitutes on hedge
/// failure, and keeps waiting through pulse — the spec's "policy-provided
/// accept" default for non-interactive mode.
pub struct AutoAcceptPolicy;

#[async_trait]
impl InteractionPort for AutoAcceptPolicy {
    async fn confirm_cost(&self, _estimate: &CostEstimate, _threshold_usd: f64) -> bool {
        true
    }

    async fn choose_hedge_recovery(&self, _agent_id: &AgentId) -> HedgeRecoveryChoice {
        HedgeRecoveryChoice::Substitute
    }

    async fn confirm_continue_waiting(&self, _agent_id: &AgentId, _elapsed_seconds: u64) -> bool {
        true
    }
}

/// Explicit non-interactive policy: rejects cost and aborts on hedge
/// failure. Pulse still defaults to waiting per spec §4.6.
pub struct AutoRejectPolicy;

#[async_trait]
impl InteractionPort for AutoRejectPolicy {
    async fn confirm_cost(&self, _estimate: &CostEstimate, _threshold_usd: f64) -> bool {
        false
    }

    async fn choose_hedge_recovery(&self, _agent_id: &AgentId) -> HedgeRecoveryChoice {
        HedgeRecoveryChoice::Abort
    }

    async fn confirm_continue_waiting(&self, _agent_id: &AgentId, _elapsed_seconds: u64) -> bool {
        true
    }
}
