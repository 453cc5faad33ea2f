//! Interactive Pulse (spec §4.6): a per-agent wall-clock watchdog that
//! prompts "keep waiting?" once an in-flight call has run past the
//! threshold, without itself cancelling anything.
//!
//! Grounded on `application/src/ports/human_intervention.rs`'s port pattern,
//! generalized from a one-shot plan decision to a recurring watchdog timer.

use std::time::Duration;

use conclave_domain::agent::AgentId;
use conclave_domain::event::Event;
use tokio_util::sync::CancellationToken;

use crate::event_bus::EventBus;
use crate::ports::interaction::InteractionPort;

#[derive(Debug, Clone, Copy)]
pub struct PulseConfig {
    pub threshold: Duration,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::from_millis(60_000),
        }
    }
}

/// Watches one in-flight agent call. Call [`Pulse::watch`] concurrently with
/// the call itself; it resolves only when the user cancels or the caller
/// drops it (the call finishing normally is the caller's job to race
/// against).
pub struct Pulse<'a> {
    config: PulseConfig,
    interaction: &'a dyn InteractionPort,
    event_bus: &'a EventBus,
}

impl<'a> Pulse<'a> {
    pub fn new(config: PulseConfig, interaction: &'a dyn InteractionPort, event_bus: &'a EventBus) -> Self {
        Self {
            config,
            interaction,
            event_bus,
        }
    }

    /// Runs until the user declines to keep waiting, at which point the
    /// given `cancel` token is fired, a `ConsultationPulseCancel` event is
    /// emitted, and the elapsed seconds at cancellation are returned. Never
    /// returns while the user keeps choosing to wait; the caller is expected
    /// to race this against the in-flight call and drop it once that call
    /// settles.
    pub async fn watch(&self, agent_id: &AgentId, cancel: CancellationToken) -> u64 {
        let started = tokio::time::Instant::now();
        loop {
            tokio::time::sleep(self.config.threshold).await;
            let elapsed_seconds = started.elapsed().as_secs();
            let keep_waiting = self
                .interaction
                .confirm_continue_waiting(agent_id, elapsed_seconds)
                .await;
            if !keep_waiting {
                self.event_bus.emit(Event::ConsultationPulseCancel {
                    agent_id: agent_id.clone(),
                    elapsed_seconds,
                });
                cancel.cancel();
                return elapsed_seconds;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::interaction::{AutoAcceptPolicy, AutoRejectPolicy, HedgeRecoveryChoice};
    use conclave_domain::cost::CostEstimate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingDecline {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl InteractionPort for CountingDecline {
        async fn confirm_cost(&self, _estimate: &CostEstimate, _threshold_usd: f64) -> bool {
            true
        }
        async fn choose_hedge_recovery(&self, _agent_id: &AgentId) -> HedgeRecoveryChoice {
            HedgeRecoveryChoice::Abort
        }
        async fn confirm_continue_waiting(&self, _agent_id: &AgentId, _elapsed_seconds: u64) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn declining_to_wait_cancels_and_emits_event() {
        let calls = Arc::new(AtomicUsize::new(0));
        let interaction = CountingDecline { calls: calls.clone() };
        let bus = EventBus::new();
        let cancelled = Arc::new(std::sync::Mutex::new(false));
        let c = cancelled.clone();
        bus.subscribe(move |event| {
            if matches!(event, Event::ConsultationPulseCancel { .. }) {
                *c.lock().unwrap() = true;
            }
        });

        let pulse = Pulse::new(
            PulseConfig {
                threshold: Duration::from_millis(10),
            },
            &interaction,
            &bus,
        );
        let cancel = CancellationToken::new();
        pulse.watch(&AgentId::new("a1"), cancel.clone()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cancel.is_cancelled());
        assert!(*cancelled.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn accept_policy_keeps_waiting_indefinitely() {
        let interaction = AutoAcceptPolicy;
        let bus = EventBus::new();
        let pulse = Pulse::new(
            PulseConfig {
                threshold: Duration::from_millis(10),
            },
            &interaction,
            &bus,
        );
        let cancel = CancellationToken::new();
        let watch = pulse.watch(&AgentId::new("a1"), cancel.clone());
        tokio::select! {
            _ = watch => panic!("auto-accept policy should never cancel"),
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
        assert!(!cancel.is_cancelled());

        // AutoRejectPolicy's pulse answer is also "keep waiting" per spec.
        let reject = AutoRejectPolicy;
        let _ = reject.confirm_continue_waiting(&AgentId::new("a1"), 1).await;
    }
}
