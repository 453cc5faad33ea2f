//! Orchestrator Facade (spec §4.9): the single public entry point a caller
//! (the CLI, or any other presentation surface) uses to run a consultation.
//!
//! Grounded on `cli/src/main.rs`'s dependency-injection wiring in the
//! teacher plus `run_quorum.rs::RunQuorumUseCase::execute`'s single
//! public-entry-point shape.

use std::sync::Arc;

use conclave_domain::agent::AgentDescriptor;
use conclave_domain::consultation::{ConsultationOptions, ConsultationResult};
use conclave_domain::core::question::Question;
use tokio_util::sync::CancellationToken;

use super::run_consultation::RunConsultationUseCase;

/// Facade over the phase scheduler. Holds no state of its own beyond the
/// wired use case; constructing one is the composition root's job.
pub struct Conclave {
    use_case: Arc<RunConsultationUseCase>,
}

impl Conclave {
    pub fn new(use_case: Arc<RunConsultationUseCase>) -> Self {
        Self { use_case }
    }

    /// Run one consultation end to end, returning its terminal result
    /// (spec's `ConsultationResult`). Never returns an `Err`: every failure
    /// mode named in the error taxonomy is represented as a terminal
    /// `ConsultationState` on the returned result instead.
    ///
    /// `cancel` is the root of the cancellation tree (spec §4.9/§5): every
    /// dispatched provider call, hedge timer, and pulse prompt races a child
    /// of this token, so cancelling it cascades to everything in flight.
    /// Callers that don't need external cancellation (tests, one-shot CLI
    /// runs with no signal handler wired up) can just pass a fresh token.
    pub async fn consult(
        &self,
        question: Question,
        agents: Vec<AgentDescriptor>,
        options: ConsultationOptions,
        cancel: CancellationToken,
    ) -> ConsultationResult {
        self.use_case.execute(question, agents, options, cancel).await
    }
}
