//! Periodic background probe of registered providers (spec §4.2).
//!
//! Grounded on `application/src/use_cases/run_quorum.rs::phase_initial`'s
//! `JoinSet` + `tokio::select!` fan-out idiom in the teacher, generalized
//! from a one-shot fan-out to a recurring `tokio::time::interval`
//! background task that never blocks the scheduler.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use conclave_domain::agent::ProviderId;
use conclave_domain::core::error::DomainError;
use conclave_domain::event::Event;
use conclave_domain::provider::{HealthStatus, ProviderHealth};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::event_bus::EventBus;
use crate::ports::provider_port::{ChatMessage, ChatOptions, ProviderRegistry};

#[derive(Debug, Clone, Copy)]
pub struct HealthMonitorConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(30_000),
            timeout: Duration::from_millis(10_000),
        }
    }
}

struct State {
    records: HashMap<ProviderId, ProviderHealth>,
    in_flight: HashSet<ProviderId>,
}

/// Keeps a fresh classification of each registered provider for backup
/// selection and observability. Runs on a separate recurring timer,
/// independent of the phase scheduler.
pub struct HealthMonitor {
    state: Mutex<State>,
    registry: ProviderRegistry,
    config: HealthMonitorConfig,
    paused: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
    event_bus: Arc<EventBus>,
}

impl HealthMonitor {
    pub fn new(registry: ProviderRegistry, config: HealthMonitorConfig, event_bus: Arc<EventBus>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                records: HashMap::new(),
                in_flight: HashSet::new(),
            }),
            registry,
            config,
            paused: AtomicBool::new(false),
            task: Mutex::new(None),
            event_bus,
        })
    }

    /// Idempotent: registering twice keeps the first record untouched.
    pub async fn register(&self, provider_id: ProviderId) {
        let mut state = self.state.lock().await;
        state.records.entry(provider_id).or_insert_with(ProviderHealth::new);
    }

    /// Launch the periodic probe. Reentrant calls are a no-op.
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return;
        }
        let monitor = self.clone();
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(monitor.config.interval);
            loop {
                interval.tick().await;
                monitor.probe_all().await;
            }
        }));
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
    }

    /// Probe every registered provider concurrently; one failing does not
    /// abort the others.
    async fn probe_all(self: &Arc<Self>) {
        let ids: Vec<ProviderId> = {
            let state = self.state.lock().await;
            state.records.keys().cloned().collect()
        };
        let mut tasks = tokio::task::JoinSet::new();
        for id in ids {
            let monitor = self.clone();
            tasks.spawn(async move {
                let _ = monitor.check_provider(&id).await;
            });
        }
        while tasks.join_next().await.is_some() {}
    }

    /// Issue one probe through the Provider Port with a hard timeout.
    /// Concurrent duplicate calls for the same provider return immediately
    /// without issuing a second probe.
    pub async fn check_provider(&self, provider_id: &ProviderId) -> Result<(), DomainError> {
        {
            let mut state = self.state.lock().await;
            if !state.records.contains_key(provider_id) {
                return Err(DomainError::NotRegistered(provider_id.clone()));
            }
            if !state.in_flight.insert(provider_id.clone()) {
                return Ok(());
            }
        }

        self.event_bus.emit(Event::HealthCheckStarted {
            provider_id: provider_id.clone(),
        });

        let provider = self.registry.get(provider_id).cloned();
        let outcome = if let Some(provider) = provider {
            let started = Instant::now();
            let probe = tokio::time::timeout(self.config.timeout, async {
                if let Some(healthy) = provider.health_check().await {
                    Ok(healthy)
                } else {
                    let messages = [ChatMessage::user("ping")];
                    provider
                        .chat(&messages, None, ChatOptions::default())
                        .await
                        .map(|_| true)
                        .map_err(|_| ())
                }
            })
            .await;
            let latency_ms = started.elapsed().as_millis() as u64;
            match probe {
                Ok(Ok(success)) => (success, Some(latency_ms)),
                _ => (false, None),
            }
        } else {
            (false, None)
        };

        self.update_status(provider_id, outcome.0, outcome.1).await;

        let mut state = self.state.lock().await;
        state.in_flight.remove(provider_id);
        Ok(())
    }

    /// Pure state transition; idempotent with respect to classification.
    pub async fn update_status(&self, provider_id: &ProviderId, success: bool, latency_ms: Option<u64>) {
        let (previous, new) = {
            let mut state = self.state.lock().await;
            let record = state
                .records
                .entry(provider_id.clone())
                .or_insert_with(ProviderHealth::new);
            record.update(success, latency_ms, Utc::now())
        };
        if previous != new && !self.paused.load(Ordering::SeqCst) {
            self.event_bus.emit(Event::HealthStatusUpdated {
                provider: provider_id.clone(),
                previous: previous.to_string(),
                new: new.to_string(),
                reason: if success { "probe_succeeded".into() } else { "probe_failed".into() },
            });
        }
    }

    pub async fn get_health(&self, provider_id: &ProviderId) -> Option<ProviderHealth> {
        self.state.lock().await.records.get(provider_id).cloned()
    }

    pub async fn get_all_health_status(&self) -> HashMap<ProviderId, HealthStatus> {
        self.state
            .lock()
            .await
            .records
            .iter()
            .map(|(id, health)| (id.clone(), health.status))
            .collect()
    }

    pub async fn has_healthy_providers(&self) -> bool {
        self.state
            .lock()
            .await
            .records
            .values()
            .any(|h| h.status == HealthStatus::Healthy)
    }

    pub async fn has_completed_first_check(&self) -> bool {
        self.state
            .lock()
            .await
            .records
            .values()
            .any(|h| h.last_checked.is_some())
    }

    /// Suppresses user-facing error *logs* only; probing continues.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }
}
