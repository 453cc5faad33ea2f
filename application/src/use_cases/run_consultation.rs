//! The phase scheduler (spec §4.7): drives one consultation through its
//! four rounds, wiring together the hedged request manager, health monitor,
//! cost gate, pulse watchdog, and event bus.
//!
//! Grounded on `application/src/use_cases/run_quorum.rs::RunQuorumUseCase` in
//! the teacher, generalized from three phases (Initial/Review/Synthesis) to
//! four (Independent/Synthesis/CrossExam/Verdict).

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use conclave_domain::agent::{AgentDescriptor, AgentId};
use conclave_domain::artifact::{
    self, ArtifactFilterConfig, ExtractError, IndependentArtifact,
};
use conclave_domain::consultation::options::Mode;
use conclave_domain::consultation::result::{
    AgentResponseSummary, ConsultationResult, ConsultationState, CostAccounting, PulseEvent,
    PulseMetadata, RoundResponses,
};
use conclave_domain::consultation::{ConsultationOptions, Phase};
use conclave_domain::cost::{CostEstimate, PriceTable, TokenUsage};
use conclave_domain::core::question::Question;
use conclave_domain::event::{Event, RoundArtifactPayload};
use conclave_domain::provider::ProviderError;
use tokio_util::sync::CancellationToken;

use crate::cost_gate::{CostGate, CostGateConfig};
use crate::event_bus::EventBus;
use crate::hedge::{AgentResponse, HedgedRequestManager};
use crate::ports::interaction::InteractionPort;
use crate::ports::project_context::ProjectContextProducer;
use crate::ports::provider_port::ChatMessage;
use crate::pulse::{Pulse, PulseConfig};

pub struct RunConsultationUseCase {
    hedge: Arc<HedgedRequestManager>,
    price_table: PriceTable,
    cost_gate_config: CostGateConfig,
    pulse_config: PulseConfig,
    filter_config: ArtifactFilterConfig,
    interaction: Arc<dyn InteractionPort>,
    event_bus: Arc<EventBus>,
    project_context: Arc<dyn ProjectContextProducer>,
}

struct DispatchOutcome {
    response: AgentResponse,
    pulse_event: Option<PulseEvent>,
}

impl RunConsultationUseCase {
    pub fn new(
        hedge: Arc<HedgedRequestManager>,
        price_table: PriceTable,
        cost_gate_config: CostGateConfig,
        pulse_config: PulseConfig,
        filter_config: ArtifactFilterConfig,
        interaction: Arc<dyn InteractionPort>,
        event_bus: Arc<EventBus>,
        project_context: Arc<dyn ProjectContextProducer>,
    ) -> Self {
        Self {
            hedge,
            price_table,
            cost_gate_config,
            pulse_config,
            filter_config,
            interaction,
            event_bus,
            project_context,
        }
    }

    fn judge_of<'a>(agents: &'a [AgentDescriptor]) -> &'a AgentDescriptor {
        agents
            .iter()
            .find(|a| a.role.as_deref() == Some("judge"))
            .unwrap_or_else(|| agents.last().expect("at least one agent configured"))
    }

    /// Advance `phase` to `next`, panicking if the scheduler graph (spec
    /// §4.7) doesn't permit it. A failing assertion here means a round was
    /// skipped or mislabeled, not a runtime condition callers can recover
    /// from.
    fn transition(&self, phase: &mut Phase, next: Phase) {
        assert!(
            phase.can_transition_to(next),
            "invalid consultation phase transition: {phase:?} -> {next:?}"
        );
        *phase = next;
    }

    pub async fn execute(
        &self,
        question: Question,
        agents: Vec<AgentDescriptor>,
        options: ConsultationOptions,
        root_cancel: CancellationToken,
    ) -> ConsultationResult {
        let consultation_id = ulid::Ulid::new().to_string();
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut phase = Phase::Idle;
        self.transition(&mut phase, Phase::Estimating);

        self.event_bus.emit(Event::ConsultationStarted {
            consultation_id: consultation_id.clone(),
            question: question.content().to_string(),
            agents: agents.iter().map(|a| a.id.clone()).collect(),
        });

        let project_context = match &options.project_path {
            Some(path) => match self.project_context.load(path).await {
                Ok(text) if text.is_empty() => None,
                Ok(text) => Some(text),
                Err(error) => {
                    self.event_bus.emit(Event::Error {
                        message: error.to_string(),
                        context: "project_context".into(),
                    });
                    None
                }
            },
            None => None,
        };

        let max_rounds = options.max_rounds.min(options.mode.max_rounds());

        let cost_gate = CostGate::new(&self.price_table, self.cost_gate_config);
        let estimate = cost_gate.estimate(&question, &agents, max_rounds);

        let proceed = if options.interactive {
            cost_gate.gate(&estimate, self.interaction.as_ref(), self.event_bus.as_ref()).await
        } else {
            let proceed_required = cost_gate.proceed_required(&estimate);
            self.event_bus.emit(Event::ConsultationCostEstimated {
                estimate,
                proceed_required,
            });
            if proceed_required {
                let accepted = options.cost_consent.unwrap_or(false);
                self.event_bus.emit(Event::ConsultationUserConsent { accepted });
                accepted
            } else {
                true
            }
        };

        if !proceed {
            self.transition(&mut phase, Phase::CostRejected);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::CostRejected,
                RoundResponses::default(),
                Vec::new(),
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate::default() },
                project_context,
                PulseMetadata::default(),
            );
        }

        let mut pulse_metadata = PulseMetadata::default();
        let mut agent_responses = Vec::new();
        let mut actual_tokens = TokenUsage::default();

        // The judge sits out rounds 1 and 3's cross-exam fan-out; it only
        // synthesizes, consolidates, and renders the verdict.
        let judge = Self::judge_of(&agents).clone();
        let advisors: Vec<&AgentDescriptor> = agents.iter().filter(|agent| agent.id != judge.id).collect();

        // Round 1: independent answers.
        self.transition(&mut phase, Phase::AwaitingRound1);
        self.transition(&mut phase, Phase::Round1);
        self.event_bus.emit(Event::RoundStart { round: 1 });
        let round1_messages: Vec<ChatMessage> = vec![ChatMessage::user(format!(
            "{}\n\n{}",
            question.content(),
            project_context.as_deref().unwrap_or("")
        ))];
        let round1_futures = advisors
            .iter()
            .copied()
            .map(|agent| self.dispatch_agent(agent, 1, round1_messages.clone(), &root_cancel));
        let round1_outcomes = futures::future::join_all(round1_futures).await;

        let mut round1_artifacts = Vec::new();
        let mut round1_aborted = false;
        for (position, (agent, outcome)) in advisors.iter().copied().zip(round1_outcomes.into_iter()).enumerate() {
            self.record_dispatch(agent, &outcome, &mut agent_responses, &mut pulse_metadata, &mut actual_tokens);
            round1_aborted |= outcome.response.aborted;
            if outcome.response.success {
                match artifact::extractor::parse_independent(
                    &outcome.response.text,
                    agent.id.clone(),
                    position,
                    Utc::now(),
                ) {
                    Ok(parsed) => {
                        self.event_bus.emit(Event::ConsultationRoundArtifact {
                            round: 1,
                            artifact: RoundArtifactPayload::Independent(parsed.clone()),
                        });
                        round1_artifacts.push(parsed);
                    }
                    Err(error) => self.emit_extract_error(agent, 1, error),
                }
            }
        }
        self.event_bus.emit(Event::RoundCompleted { round: 1, artifact_type: "independent".into() });

        if round1_aborted {
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses { round1: round1_artifacts, ..Default::default() },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        }

        if round1_artifacts.is_empty() {
            self.transition(&mut phase, Phase::AllAgentsFailed);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::AllAgentsFailed,
                RoundResponses { round1: round1_artifacts, ..Default::default() },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        }

        if max_rounds == 1 {
            self.transition(&mut phase, Phase::Complete);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Complete,
                RoundResponses { round1: round1_artifacts, ..Default::default() },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        }

        // Round 2: judge synthesis.
        self.transition(&mut phase, Phase::Round2);
        self.event_bus.emit(Event::RoundStart { round: 2 });
        let synthesis_prompt = build_synthesis_prompt(&question, &round1_artifacts);
        let synthesis_outcome = self
            .dispatch_agent(&judge, 2, vec![ChatMessage::user(synthesis_prompt)], &root_cancel)
            .await;
        self.record_dispatch(&judge, &synthesis_outcome, &mut agent_responses, &mut pulse_metadata, &mut actual_tokens);

        if synthesis_outcome.response.aborted {
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses { round1: round1_artifacts, ..Default::default() },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        }

        let synthesis = if synthesis_outcome.response.success {
            artifact::extractor::parse_synthesis(&synthesis_outcome.response.text, Utc::now()).ok()
        } else {
            None
        };
        self.event_bus.emit(Event::RoundCompleted { round: 2, artifact_type: "synthesis".into() });

        let Some(synthesis) = synthesis else {
            // A judge failure mid-debate is fatal (spec §4.7/§7): unlike a
            // round-1 advisor dropping out, there is no quorum fallback for
            // a missing synthesis.
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses { round1: round1_artifacts, ..Default::default() },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        };
        self.event_bus.emit(Event::ConsultationRoundArtifact {
            round: 2,
            artifact: RoundArtifactPayload::Synthesis(synthesis.clone()),
        });

        let filtered_synthesis = artifact::filter::filter_synthesis(&synthesis, &self.filter_config);
        let round1_agent_ids: Vec<AgentId> = round1_artifacts.iter().map(|a| a.agent_id.clone()).collect();

        // Round 3: cross-examination, then judge consolidation. Only agents
        // that produced a round-1 artifact re-enter; a failed agent has no
        // independent artifact of its own to defend.
        self.transition(&mut phase, Phase::Round3);
        self.event_bus.emit(Event::RoundStart { round: 3 });
        let surviving_agents: Vec<&AgentDescriptor> = advisors
            .iter()
            .copied()
            .filter(|agent| round1_artifacts.iter().any(|artifact| artifact.agent_id == agent.id))
            .collect();
        let cross_exam_prompt = build_cross_exam_prompt(&filtered_synthesis);
        let round3_futures = surviving_agents
            .iter()
            .map(|agent| self.dispatch_agent(agent, 3, vec![ChatMessage::user(cross_exam_prompt.clone())], &root_cancel));
        let round3_outcomes = futures::future::join_all(round3_futures).await;

        let mut cross_exam_texts = Vec::new();
        let mut round3_aborted = false;
        for (agent, outcome) in surviving_agents.iter().zip(round3_outcomes.into_iter()) {
            self.record_dispatch(agent, &outcome, &mut agent_responses, &mut pulse_metadata, &mut actual_tokens);
            round3_aborted |= outcome.response.aborted;
            if outcome.response.success {
                cross_exam_texts.push((agent.id.clone(), outcome.response.text));
            }
        }

        if round3_aborted {
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses { round1: round1_artifacts, round2: Some(synthesis), ..Default::default() },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        }

        let consolidation_prompt = build_consolidation_prompt(&cross_exam_texts);
        let consolidation_outcome = self
            .dispatch_agent(&judge, 3, vec![ChatMessage::user(consolidation_prompt)], &root_cancel)
            .await;
        self.record_dispatch(&judge, &consolidation_outcome, &mut agent_responses, &mut pulse_metadata, &mut actual_tokens);

        if consolidation_outcome.response.aborted {
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses { round1: round1_artifacts, round2: Some(synthesis), ..Default::default() },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        }

        let cross_exam = if consolidation_outcome.response.success {
            artifact::extractor::parse_cross_exam(&consolidation_outcome.response.text, Utc::now())
                .ok()
                .filter(|candidate| {
                    let valid = candidate.targets_are_valid(&round1_agent_ids);
                    if !valid {
                        self.event_bus.emit(Event::Error {
                            message: "cross-exam challenge targets an agent outside round 1".into(),
                            context: format!("round_3:{}", judge.id),
                        });
                    }
                    valid
                })
        } else {
            None
        };
        self.event_bus.emit(Event::RoundCompleted { round: 3, artifact_type: "cross_exam".into() });

        let Some(cross_exam) = cross_exam else {
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses {
                    round1: round1_artifacts,
                    round2: Some(synthesis),
                    ..Default::default()
                },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        };
        self.event_bus.emit(Event::ConsultationRoundArtifact {
            round: 3,
            artifact: RoundArtifactPayload::CrossExam(cross_exam.clone()),
        });

        let filtered_cross_exam = artifact::filter::filter_cross_exam(&cross_exam, &self.filter_config);

        // Round 4: verdict.
        self.transition(&mut phase, Phase::Round4);
        self.event_bus.emit(Event::RoundStart { round: 4 });
        let verdict_prompt = build_verdict_prompt(&filtered_cross_exam);
        let verdict_outcome = self
            .dispatch_agent(&judge, 4, vec![ChatMessage::user(verdict_prompt)], &root_cancel)
            .await;
        self.record_dispatch(&judge, &verdict_outcome, &mut agent_responses, &mut pulse_metadata, &mut actual_tokens);

        if verdict_outcome.response.aborted {
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses {
                    round1: round1_artifacts,
                    round2: Some(synthesis),
                    round3: Some(cross_exam),
                    round4: None,
                },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        }

        let verdict = if verdict_outcome.response.success {
            artifact::extractor::parse_verdict(&verdict_outcome.response.text, Utc::now()).ok()
        } else {
            None
        };
        self.event_bus.emit(Event::RoundCompleted { round: 4, artifact_type: "verdict".into() });

        let Some(verdict) = verdict else {
            self.transition(&mut phase, Phase::Aborted);
            return self.finalize(
                consultation_id,
                question,
                options.mode,
                started_at,
                clock,
                ConsultationState::Aborted,
                RoundResponses {
                    round1: round1_artifacts,
                    round2: Some(synthesis),
                    round3: Some(cross_exam),
                    round4: None,
                },
                agent_responses,
                agents,
                CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
                project_context,
                pulse_metadata,
            );
        };
        self.event_bus.emit(Event::ConsultationRoundArtifact {
            round: 4,
            artifact: RoundArtifactPayload::Verdict(verdict.clone()),
        });

        self.transition(&mut phase, Phase::Complete);
        let result = self.finalize(
            consultation_id,
            question,
            options.mode,
            started_at,
            clock,
            ConsultationState::Complete,
            RoundResponses {
                round1: round1_artifacts,
                round2: Some(synthesis),
                round3: Some(cross_exam),
                round4: Some(verdict),
            },
            agent_responses,
            agents,
            CostAccounting { estimated: estimate, actual: CostEstimate { tokens: actual_tokens, usd: 0.0 } },
            project_context,
            pulse_metadata,
        );
        result
    }

    async fn dispatch_agent(
        &self,
        agent: &AgentDescriptor,
        round: u8,
        messages: Vec<ChatMessage>,
        root_cancel: &CancellationToken,
    ) -> DispatchOutcome {
        self.event_bus.emit(Event::AgentThinking {
            agent_id: agent.id.clone(),
            agent_name: agent.display_name.clone(),
            round,
        });

        // A child of the consultation-wide root: cancelling it here (pulse
        // decline) only affects this agent's call, but cancelling the root
        // (e.g. a hedge abort elsewhere) cascades down into it too.
        let cancel = root_cancel.child_token();
        let pulse = Pulse::new(self.pulse_config, self.interaction.as_ref(), self.event_bus.as_ref());
        let started = Instant::now();

        let outcome = tokio::select! {
            biased;
            result = self.hedge.execute(agent, &messages, None, cancel.clone()) => {
                DispatchOutcome { response: result, pulse_event: None }
            }
            elapsed_seconds = pulse.watch(&agent.id, cancel.clone()) => {
                let event = PulseEvent {
                    agent_id: agent.id.clone(),
                    elapsed_seconds,
                    user_cancelled: true,
                };
                let response = AgentResponse {
                    provider_id: agent.provider_id.clone(),
                    text: String::new(),
                    usage: TokenUsage::default(),
                    success: false,
                    provider_error: Some(ProviderError::user_cancelled_via_pulse()),
                    latency_ms: started.elapsed().as_millis() as u64,
                    was_substituted: false,
                    aborted: false,
                };
                DispatchOutcome { response, pulse_event: Some(event) }
            }
        };

        self.event_bus.emit(Event::AgentCompleted {
            agent_id: agent.id.clone(),
            agent_name: agent.display_name.clone(),
            round,
            success: outcome.response.success,
            latency_ms: Some(outcome.response.latency_ms),
        });

        outcome
    }

    fn record_dispatch(
        &self,
        agent: &AgentDescriptor,
        outcome: &DispatchOutcome,
        agent_responses: &mut Vec<AgentResponseSummary>,
        pulse_metadata: &mut PulseMetadata,
        actual_tokens: &mut TokenUsage,
    ) {
        actual_tokens.add(outcome.response.usage);
        agent_responses.push(AgentResponseSummary {
            agent_id: agent.id.clone(),
            provider_id: outcome.response.provider_id.clone(),
            success: outcome.response.success,
            latency_ms: Some(outcome.response.latency_ms),
            provider_error: outcome.response.provider_error.clone(),
            was_substituted: outcome.response.was_substituted,
        });
        if let Some(event) = &outcome.pulse_event {
            pulse_metadata.record(event.clone());
        }
    }

    fn emit_extract_error(&self, agent: &AgentDescriptor, round: u8, error: ExtractError) {
        self.event_bus.emit(Event::Error {
            message: error.to_string(),
            context: format!("round_{round}:{}", agent.id),
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        consultation_id: String,
        question: Question,
        mode: Mode,
        started_at: chrono::DateTime<Utc>,
        clock: Instant,
        state: ConsultationState,
        responses: RoundResponses,
        agent_responses: Vec<AgentResponseSummary>,
        agents: Vec<AgentDescriptor>,
        cost: CostAccounting,
        project_context: Option<String>,
        pulse_metadata: PulseMetadata,
    ) -> ConsultationResult {
        let recommendation = responses.round4.as_ref().map(|v| v.recommendation.clone());
        let confidence = responses.round4.as_ref().map(|v| v.confidence);
        let dissent = responses
            .round4
            .as_ref()
            .map(|v| v.dissent.clone())
            .unwrap_or_default();

        let result = ConsultationResult {
            consultation_id,
            question,
            mode,
            timestamp: started_at,
            duration_ms: clock.elapsed().as_millis() as u64,
            state,
            responses,
            recommendation,
            confidence,
            dissent,
            tokens: cost.actual.tokens,
            cost,
            agents,
            agent_responses,
            project_context,
            token_efficiency_stats: None,
            pulse_metadata,
        };

        self.event_bus.emit(Event::ConsultationCompleted {
            result: Box::new(result.clone()),
        });
        result
    }
}

fn build_synthesis_prompt(question: &Question, round1: &[IndependentArtifact]) -> String {
    let mut prompt = format!(
        "Question: {}\n\nSynthesize the following independent answers into consensus points, \
         tensions, and a priority order. Respond as JSON with keys consensusPoints, tensions, \
         priorityOrder.\n\n",
        question.content()
    );
    for artifact in round1 {
        prompt.push_str(&format!(
            "- agent {}: {} (confidence {:.2})\n",
            artifact.agent_id, artifact.rationale, artifact.confidence
        ));
    }
    prompt
}

fn build_cross_exam_prompt(synthesis: &conclave_domain::artifact::SynthesisArtifact) -> String {
    let mut prompt = String::from(
        "Given this synthesis of the group's positions, challenge any claims you find \
         unsupported and rebut challenges you anticipate against your own position. Respond \
         in prose.\n\n",
    );
    for point in &synthesis.consensus_points {
        prompt.push_str(&format!("- consensus: {}\n", point.point));
    }
    for tension in &synthesis.tensions {
        prompt.push_str(&format!("- tension: {}\n", tension.topic));
    }
    prompt
}

fn build_consolidation_prompt(cross_exam_texts: &[(AgentId, String)]) -> String {
    let mut prompt = String::from(
        "Consolidate the following agents' challenges and rebuttals into a single report. \
         Respond as JSON with keys challenges, rebuttals, unresolved.\n\n",
    );
    for (agent_id, text) in cross_exam_texts {
        prompt.push_str(&format!("- {agent_id}: {text}\n"));
    }
    prompt
}

fn build_verdict_prompt(cross_exam: &conclave_domain::artifact::CrossExamArtifact) -> String {
    let mut prompt = String::from(
        "Render a final recommendation given the unresolved tensions and challenges below. \
         Respond as JSON with keys recommendation, confidence, evidence, dissent.\n\n",
    );
    for item in &cross_exam.unresolved {
        prompt.push_str(&format!("- unresolved: {item}\n"));
    }
    prompt
}
