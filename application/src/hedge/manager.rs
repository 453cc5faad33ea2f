//! Hedged Request Manager (spec §4.3): one logical call, low tail latency,
//! automatic failover, interactive recovery on total failure.
//!
//! Grounded on `application/src/use_cases/run_quorum.rs`'s fan-out idiom in
//! the teacher plus the retrieved `tower::hedge` stagger-then-race pattern,
//! reimplemented over `tokio::select!` / `tokio_util::sync::CancellationToken`
//! since the teacher does not depend on `tower`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use conclave_domain::agent::{AgentDescriptor, ProviderId};
use conclave_domain::cost::TokenUsage;
use conclave_domain::event::{Event, SubstitutionReason};
use conclave_domain::provider::{BackupCandidates, ProviderError, ProviderErrorKind, TierMap};
use tokio_util::sync::CancellationToken;

use crate::event_bus::EventBus;
use crate::health::HealthMonitor;
use crate::ports::interaction::{HedgeRecoveryChoice, InteractionPort};
use crate::ports::provider_port::{ChatMessage, ChatOptions, ProviderRegistry};

#[derive(Debug, Clone, Copy)]
pub struct HedgeConfig {
    pub stagger_delay: Duration,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            stagger_delay: Duration::from_millis(10_000),
        }
    }
}

/// One agent's final dispatch outcome, regardless of whether it came from
/// the primary, the hedged backup, or a user-chosen substitute.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    pub provider_id: ProviderId,
    pub text: String,
    pub usage: TokenUsage,
    pub success: bool,
    pub provider_error: Option<ProviderError>,
    pub latency_ms: u64,
    pub was_substituted: bool,
    /// Set when the user chose [`HedgeRecoveryChoice::Abort`] for this
    /// agent. Distinguishes a whole-consultation abort from an ordinary
    /// per-agent failure; the scheduler checks this to terminate the run
    /// instead of continuing with one fewer agent.
    pub aborted: bool,
}

impl AgentResponse {
    fn empty(provider_id: ProviderId, error: ProviderError) -> Self {
        Self {
            provider_id,
            text: String::new(),
            usage: TokenUsage::default(),
            success: false,
            provider_error: Some(error),
            latency_ms: 0,
            was_substituted: false,
            aborted: false,
        }
    }

    fn aborted(provider_id: ProviderId, error: ProviderError) -> Self {
        Self {
            provider_id,
            text: String::new(),
            usage: TokenUsage::default(),
            success: false,
            provider_error: Some(error),
            latency_ms: 0,
            was_substituted: false,
            aborted: true,
        }
    }
}

struct CallOutcome {
    provider_id: ProviderId,
    success: bool,
    text: String,
    usage: TokenUsage,
    error: Option<ProviderError>,
    latency_ms: u64,
}

type BoxedCall = Pin<Box<dyn Future<Output = CallOutcome> + Send>>;

pub struct HedgedRequestManager {
    registry: ProviderRegistry,
    health_monitor: Arc<HealthMonitor>,
    tier_map: Arc<TierMap>,
    config: HedgeConfig,
    event_bus: Arc<EventBus>,
    interaction: Arc<dyn InteractionPort>,
    interactive: bool,
}

impl HedgedRequestManager {
    pub fn new(
        registry: ProviderRegistry,
        health_monitor: Arc<HealthMonitor>,
        tier_map: Arc<TierMap>,
        config: HedgeConfig,
        event_bus: Arc<EventBus>,
        interaction: Arc<dyn InteractionPort>,
        interactive: bool,
    ) -> Self {
        Self {
            registry,
            health_monitor,
            tier_map,
            config,
            event_bus,
            interaction,
            interactive,
        }
    }

    fn call(
        &self,
        provider_id: ProviderId,
        messages: Vec<ChatMessage>,
        system_prompt: Option<String>,
        cancel: CancellationToken,
    ) -> BoxedCall {
        let provider = self.registry.get(&provider_id).cloned();
        Box::pin(async move {
            let Some(provider) = provider else {
                return CallOutcome {
                    provider_id,
                    success: false,
                    text: String::new(),
                    usage: TokenUsage::default(),
                    error: Some(ProviderError::new(
                        ProviderErrorKind::Transport,
                        "provider not registered",
                        false,
                    )),
                    latency_ms: 0,
                };
            };
            let started = Instant::now();
            let options = ChatOptions {
                cancel_token: Some(cancel.clone()),
                max_tokens: None,
            };
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ProviderError::cancelled()),
                result = provider.chat(&messages, system_prompt.as_deref(), options) => result,
            };
            let latency_ms = started.elapsed().as_millis() as u64;
            match outcome {
                Ok(response) => CallOutcome {
                    provider_id,
                    success: true,
                    text: response.text,
                    usage: TokenUsage::new(response.input_tokens, response.output_tokens),
                    error: None,
                    latency_ms,
                },
                Err(error) => CallOutcome {
                    provider_id,
                    success: false,
                    text: String::new(),
                    usage: TokenUsage::default(),
                    error: Some(error),
                    latency_ms,
                },
            }
        })
    }

    /// Execute one logical inference call for `agent`.
    pub async fn execute(
        &self,
        agent: &AgentDescriptor,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        root_cancel: CancellationToken,
    ) -> AgentResponse {
        let messages_owned = messages.to_vec();
        let system_prompt_owned = system_prompt.map(str::to_string);

        let primary_cancel = root_cancel.child_token();
        let mut primary_fut = self.call(
            agent.provider_id.clone(),
            messages_owned.clone(),
            system_prompt_owned.clone(),
            primary_cancel.clone(),
        );

        // Race the primary against the staggered hedge timer.
        let stagger = tokio::time::sleep(self.config.stagger_delay);
        tokio::pin!(stagger);
        let primary_outcome = tokio::select! {
            outcome = &mut primary_fut => Some(outcome),
            _ = &mut stagger => None,
        };

        let primary_outcome = match primary_outcome {
            Some(outcome) => outcome,
            None => {
                // Timer fired first: look for a healthy backup.
                let health = self.health_monitor.get_all_health_status().await;
                let backup_id =
                    BackupCandidates::select(&self.tier_map, &health, &agent.provider_id);
                match backup_id {
                    None => primary_fut.await,
                    Some(backup_id) => {
                        self.event_bus.emit(Event::ConsultationProviderSubstituted {
                            agent_id: agent.id.clone(),
                            original_provider: agent.provider_id.clone(),
                            substitute_provider: backup_id.clone(),
                            reason: SubstitutionReason::Timeout,
                        });
                        let backup_cancel = root_cancel.child_token();
                        let backup_fut = self.call(
                            backup_id,
                            messages_owned.clone(),
                            system_prompt_owned.clone(),
                            backup_cancel.clone(),
                        );
                        self.race_winner_takes_all(
                            primary_fut,
                            backup_fut,
                            primary_cancel.clone(),
                            backup_cancel,
                        )
                        .await
                    }
                }
            }
        };

        self.record_health(&primary_outcome).await;

        if primary_outcome.success {
            let was_substituted = primary_outcome.provider_id != agent.provider_id;
            return self.into_response(primary_outcome, was_substituted);
        }

        // Total failure path.
        self.recover_from_total_failure(agent, primary_outcome, messages_owned, system_prompt_owned, root_cancel)
            .await
    }

    /// Race two in-flight calls; whichever succeeds first wins and the
    /// loser's cancel token is fired within the same tick. If the first to
    /// settle is a failure, keep waiting on the other.
    async fn race_winner_takes_all(
        &self,
        mut primary: BoxedCall,
        mut backup: BoxedCall,
        primary_cancel: CancellationToken,
        backup_cancel: CancellationToken,
    ) -> CallOutcome {
        let mut primary_result: Option<CallOutcome> = None;
        let mut backup_result: Option<CallOutcome> = None;

        loop {
            tokio::select! {
                outcome = &mut primary, if primary_result.is_none() => {
                    primary_result = Some(outcome);
                }
                outcome = &mut backup, if backup_result.is_none() => {
                    backup_result = Some(outcome);
                }
            }

            if matches!(&primary_result, Some(o) if o.success) {
                backup_cancel.cancel();
                return primary_result.unwrap();
            }
            if matches!(&backup_result, Some(o) if o.success) {
                primary_cancel.cancel();
                return backup_result.unwrap();
            }
            if primary_result.is_some() && backup_result.is_some() {
                // Both failed: report the backup's failure since it is the
                // more recent attempt.
                return backup_result.unwrap();
            }
        }
    }

    async fn record_health(&self, outcome: &CallOutcome) {
        self.health_monitor
            .update_status(&outcome.provider_id, outcome.success, Some(outcome.latency_ms).filter(|_| outcome.success))
            .await;
    }

    async fn recover_from_total_failure(
        &self,
        agent: &AgentDescriptor,
        last_failure: CallOutcome,
        messages: Vec<ChatMessage>,
        system_prompt: Option<String>,
        root_cancel: CancellationToken,
    ) -> AgentResponse {
        let health = self.health_monitor.get_all_health_status().await;
        let candidate = BackupCandidates::select(&self.tier_map, &health, &agent.provider_id);

        let Some(candidate) = candidate else {
            return self.into_response(last_failure, false);
        };

        let choice = if self.interactive {
            self.interaction.choose_hedge_recovery(&agent.id).await
        } else {
            HedgeRecoveryChoice::Substitute
        };

        match choice {
            HedgeRecoveryChoice::Abort => {
                // Cascades to every other in-flight dispatch racing on a
                // child of this same root token (spec §4.9).
                root_cancel.cancel();
                AgentResponse::aborted(
                    agent.provider_id.clone(),
                    ProviderError::new(ProviderErrorKind::Cancelled, "consultation_aborted", false),
                )
            }
            HedgeRecoveryChoice::Skip => {
                AgentResponse::empty(agent.provider_id.clone(), ProviderError::user_skipped())
            }
            HedgeRecoveryChoice::Substitute => {
                self.event_bus.emit(Event::ConsultationProviderSubstituted {
                    agent_id: agent.id.clone(),
                    original_provider: agent.provider_id.clone(),
                    substitute_provider: candidate.clone(),
                    reason: SubstitutionReason::Failure,
                });
                let substitute_cancel = root_cancel.child_token();
                let outcome = self
                    .call(candidate, messages, system_prompt, substitute_cancel)
                    .await;
                self.record_health(&outcome).await;
                self.into_response(outcome, true)
            }
        }
    }

    fn into_response(&self, outcome: CallOutcome, was_substituted: bool) -> AgentResponse {
        AgentResponse {
            provider_id: outcome.provider_id,
            text: outcome.text,
            usage: outcome.usage,
            success: outcome.success,
            provider_error: outcome.error,
            latency_ms: outcome.latency_ms,
            was_substituted,
            aborted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthMonitorConfig;
    use crate::ports::interaction::AutoAcceptPolicy;
    use crate::ports::provider_port::{ChatResponse, ProviderPort, ProviderRegistry};
    use async_trait::async_trait;
    use conclave_domain::provider::Tier;
    use std::collections::HashMap;

    #[derive(Clone)]
    enum FakeBehavior {
        Succeed,
        Fail,
        Hang(Duration),
    }

    struct AlwaysAbort;

    #[async_trait]
    impl InteractionPort for AlwaysAbort {
        async fn confirm_cost(&self, _estimate: &conclave_domain::cost::CostEstimate, _threshold_usd: f64) -> bool {
            true
        }
        async fn choose_hedge_recovery(&self, _agent_id: &conclave_domain::agent::AgentId) -> HedgeRecoveryChoice {
            HedgeRecoveryChoice::Abort
        }
        async fn confirm_continue_waiting(&self, _agent_id: &conclave_domain::agent::AgentId, _elapsed_seconds: u64) -> bool {
            true
        }
    }

    struct FakeProvider {
        id: ProviderId,
        behavior: FakeBehavior,
    }

    impl FakeProvider {
        fn new(id: &str, behavior: FakeBehavior) -> Arc<Self> {
            Arc::new(Self { id: ProviderId::new(id), behavior })
        }
    }

    #[async_trait]
    impl ProviderPort for FakeProvider {
        fn provider_id(&self) -> ProviderId {
            self.id.clone()
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _system_prompt: Option<&str>,
            options: ChatOptions,
        ) -> Result<ChatResponse, ProviderError> {
            match &self.behavior {
                FakeBehavior::Succeed => Ok(ChatResponse {
                    text: "ok".into(),
                    input_tokens: 5,
                    output_tokens: 5,
                }),
                FakeBehavior::Fail => {
                    Err(ProviderError::new(ProviderErrorKind::Transport, "boom", true))
                }
                FakeBehavior::Hang(delay) => {
                    if let Some(cancel) = options.cancel_token {
                        tokio::select! {
                            _ = tokio::time::sleep(*delay) => {}
                            _ = cancel.cancelled() => return Err(ProviderError::cancelled()),
                        }
                    } else {
                        tokio::time::sleep(*delay).await;
                    }
                    Ok(ChatResponse {
                        text: "late".into(),
                        input_tokens: 5,
                        output_tokens: 5,
                    })
                }
            }
        }
    }

    fn agent(provider_id: &str) -> AgentDescriptor {
        AgentDescriptor::new("a1", "Advisor One", provider_id)
    }

    fn manager(
        registry: ProviderRegistry,
        tier_map: TierMap,
        stagger_delay: Duration,
    ) -> HedgedRequestManager {
        let event_bus = Arc::new(EventBus::new());
        let health_monitor = HealthMonitor::new(registry.clone(), HealthMonitorConfig::default(), event_bus.clone());
        HedgedRequestManager::new(
            registry,
            health_monitor,
            Arc::new(tier_map),
            HedgeConfig { stagger_delay },
            event_bus,
            Arc::new(AutoAcceptPolicy),
            false,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn primary_completes_before_stagger_skips_backup() {
        let mut registry: ProviderRegistry = HashMap::new();
        registry.insert(ProviderId::new("primary"), FakeProvider::new("primary", FakeBehavior::Succeed));
        let manager = manager(registry, TierMap::new(), Duration::from_millis(50));

        let response = manager
            .execute(&agent("primary"), &[], None, CancellationToken::new())
            .await;

        assert!(response.success);
        assert!(!response.was_substituted);
        assert_eq!(response.provider_id, ProviderId::new("primary"));
    }

    #[tokio::test(start_paused = true)]
    async fn stagger_then_backup_wins_and_flags_substitution() {
        let mut registry: ProviderRegistry = HashMap::new();
        registry.insert(
            ProviderId::new("primary"),
            FakeProvider::new("primary", FakeBehavior::Hang(Duration::from_secs(5))),
        );
        registry.insert(ProviderId::new("backup"), FakeProvider::new("backup", FakeBehavior::Succeed));

        let mut tier_map = TierMap::new();
        tier_map.insert(ProviderId::new("primary"), Tier::T1);
        tier_map.insert(ProviderId::new("backup"), Tier::T1);

        let event_bus = Arc::new(EventBus::new());
        let health_monitor = HealthMonitor::new(registry.clone(), HealthMonitorConfig::default(), event_bus.clone());
        health_monitor.register(ProviderId::new("backup")).await;
        health_monitor.update_status(&ProviderId::new("backup"), true, Some(50)).await;

        let substituted = Arc::new(std::sync::Mutex::new(false));
        let s = substituted.clone();
        event_bus.subscribe(move |event| {
            if let Event::ConsultationProviderSubstituted { reason, .. } = event {
                if matches!(reason, SubstitutionReason::Timeout) {
                    *s.lock().unwrap() = true;
                }
            }
        });

        let manager = HedgedRequestManager::new(
            registry,
            health_monitor,
            Arc::new(tier_map),
            HedgeConfig { stagger_delay: Duration::from_millis(50) },
            event_bus,
            Arc::new(AutoAcceptPolicy),
            false,
        );

        let response = manager
            .execute(&agent("primary"), &[], None, CancellationToken::new())
            .await;

        assert!(response.success);
        assert_eq!(response.provider_id, ProviderId::new("backup"));
        assert!(response.was_substituted);
        assert!(*substituted.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_with_no_backup_returns_failed_response() {
        let mut registry: ProviderRegistry = HashMap::new();
        registry.insert(ProviderId::new("primary"), FakeProvider::new("primary", FakeBehavior::Fail));
        let manager = manager(registry, TierMap::new(), Duration::from_millis(50));

        let response = manager
            .execute(&agent("primary"), &[], None, CancellationToken::new())
            .await;

        assert!(!response.success);
        assert!(!response.was_substituted);
        assert_eq!(response.provider_error.unwrap().kind, ProviderErrorKind::Transport);
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_substitutes_via_auto_accept_policy() {
        let mut registry: ProviderRegistry = HashMap::new();
        registry.insert(ProviderId::new("primary"), FakeProvider::new("primary", FakeBehavior::Fail));
        registry.insert(ProviderId::new("backup"), FakeProvider::new("backup", FakeBehavior::Succeed));

        let mut tier_map = TierMap::new();
        tier_map.insert(ProviderId::new("primary"), Tier::T1);
        tier_map.insert(ProviderId::new("backup"), Tier::T1);

        let event_bus = Arc::new(EventBus::new());
        let health_monitor = HealthMonitor::new(registry.clone(), HealthMonitorConfig::default(), event_bus.clone());
        health_monitor.register(ProviderId::new("backup")).await;
        health_monitor.update_status(&ProviderId::new("backup"), true, Some(50)).await;

        let manager = HedgedRequestManager::new(
            registry,
            health_monitor,
            Arc::new(tier_map),
            HedgeConfig { stagger_delay: Duration::from_millis(50) },
            event_bus,
            Arc::new(AutoAcceptPolicy),
            true,
        );

        let response = manager
            .execute(&agent("primary"), &[], None, CancellationToken::new())
            .await;

        assert!(response.success);
        assert!(response.was_substituted);
        assert_eq!(response.provider_id, ProviderId::new("backup"));
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_abort_choice_flags_aborted_and_cancels_root() {
        let mut registry: ProviderRegistry = HashMap::new();
        registry.insert(ProviderId::new("primary"), FakeProvider::new("primary", FakeBehavior::Fail));
        registry.insert(ProviderId::new("backup"), FakeProvider::new("backup", FakeBehavior::Succeed));

        let mut tier_map = TierMap::new();
        tier_map.insert(ProviderId::new("primary"), Tier::T1);
        tier_map.insert(ProviderId::new("backup"), Tier::T1);

        let event_bus = Arc::new(EventBus::new());
        let health_monitor = HealthMonitor::new(registry.clone(), HealthMonitorConfig::default(), event_bus.clone());
        health_monitor.register(ProviderId::new("backup")).await;
        health_monitor.update_status(&ProviderId::new("backup"), true, Some(50)).await;

        let manager = HedgedRequestManager::new(
            registry,
            health_monitor,
            Arc::new(tier_map),
            HedgeConfig { stagger_delay: Duration::from_millis(50) },
            event_bus,
            Arc::new(AlwaysAbort),
            true,
        );

        let root_cancel = CancellationToken::new();
        let response = manager.execute(&agent("primary"), &[], None, root_cancel.clone()).await;

        assert!(!response.success);
        assert!(response.aborted);
        assert!(root_cancel.is_cancelled());
    }
}
