//! Cost Gate (spec §4.5): pre-flight estimate, then a consent checkpoint
//! before any provider is dispatched.
//!
//! Grounded on `application/src/ports/human_intervention.rs`'s port +
//! auto-approve/-reject built-ins pattern in the teacher.

use conclave_domain::agent::AgentDescriptor;
use conclave_domain::core::question::Question;
use conclave_domain::cost::{CostEstimate, PriceTable};
use conclave_domain::event::Event;

use crate::event_bus::EventBus;
use crate::ports::interaction::InteractionPort;

#[derive(Debug, Clone, Copy)]
pub struct CostGateConfig {
    pub threshold_usd: f64,
}

impl Default for CostGateConfig {
    fn default() -> Self {
        Self { threshold_usd: 1.0 }
    }
}

/// Pre-flight estimate plus a consent checkpoint. An estimate at or below
/// the threshold proceeds without prompting; above it, the configured
/// [`InteractionPort`] decides.
pub struct CostGate<'a> {
    price_table: &'a PriceTable,
    config: CostGateConfig,
}

impl<'a> CostGate<'a> {
    pub fn new(price_table: &'a PriceTable, config: CostGateConfig) -> Self {
        Self { price_table, config }
    }

    pub fn estimate(&self, question: &Question, agents: &[AgentDescriptor], rounds: u8) -> CostEstimate {
        self.price_table.estimate(question, agents, rounds)
    }

    /// Whether `estimate` clears the configured threshold and therefore
    /// needs an explicit consent decision before any provider is dispatched.
    pub fn proceed_required(&self, estimate: &CostEstimate) -> bool {
        estimate.usd > self.config.threshold_usd
    }

    /// Returns `true` if the consultation should proceed. Emits
    /// `ConsultationCostEstimated` always, and `ConsultationUserConsent` only
    /// when the gate was actually consulted (estimate above threshold).
    pub async fn gate(
        &self,
        estimate: &CostEstimate,
        interaction: &dyn InteractionPort,
        event_bus: &EventBus,
    ) -> bool {
        let proceed_required = self.proceed_required(estimate);
        event_bus.emit(Event::ConsultationCostEstimated {
            estimate: *estimate,
            proceed_required,
        });

        if !proceed_required {
            return true;
        }

        let accepted = interaction.confirm_cost(estimate, self.config.threshold_usd).await;
        event_bus.emit(Event::ConsultationUserConsent { accepted });
        accepted
    }
}
