//! Cost estimation: per-model price tables and a fixed token model,
//! grounded on the teacher's config-key validation style (a static,
//! lookup-by-key table with a safe default for unknown keys).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::agent::{AgentDescriptor, ProviderId};
use crate::core::question::Question;

/// Rough per-agent-round token allowance used for the upper-bound estimate.
/// Deliberately generous; this is a pre-flight ceiling, not a metering figure.
const ESTIMATED_OUTPUT_TOKENS_PER_CALL: u64 = 900;

/// Fixed overhead added per round for system prompt + prior-artifact context.
const ROUND_OVERHEAD_TOKENS: u64 = 400;

/// Naive input-token estimate: ~4 bytes per token, rounded up.
fn estimate_input_tokens(text: &str) -> u64 {
    ((text.len() as u64) + 3) / 4
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.input += other.input;
        self.output += other.output;
        self.total += other.total;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub tokens: TokenUsage,
    pub usd: f64,
}

/// Per-provider price in USD per 1,000 tokens.
#[derive(Debug, Clone, Copy)]
pub struct ModelPrice {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

/// Static, read-only price table. Unknown providers fall back to a
/// conservative default rather than failing the estimate.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: HashMap<ProviderId, ModelPrice>,
    default_price: ModelPrice,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            prices: HashMap::new(),
            default_price: ModelPrice {
                input_per_1k: 0.01,
                output_per_1k: 0.03,
            },
        }
    }
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider_id: ProviderId, price: ModelPrice) -> &mut Self {
        self.prices.insert(provider_id, price);
        self
    }

    pub fn price_of(&self, provider_id: &ProviderId) -> ModelPrice {
        self.prices
            .get(provider_id)
            .copied()
            .unwrap_or(self.default_price)
    }

    /// Pre-flight estimate for running `agents` through `rounds` rounds over
    /// `question`, including one judge call per non-independent round.
    pub fn estimate(&self, question: &Question, agents: &[AgentDescriptor], rounds: u8) -> CostEstimate {
        let input_tokens = estimate_input_tokens(question.content());
        let mut tokens = TokenUsage::default();
        let mut usd = 0.0;

        // Round 1: every agent answers independently.
        for agent in agents {
            let price = self.price_of(&agent.provider_id);
            let round_input = input_tokens + ROUND_OVERHEAD_TOKENS;
            tokens.add(TokenUsage::new(round_input, ESTIMATED_OUTPUT_TOKENS_PER_CALL));
            usd += cost_usd(price, round_input, ESTIMATED_OUTPUT_TOKENS_PER_CALL);
        }

        // Rounds 2-4: one judge call each, using the first agent's provider
        // as a stand-in price when no dedicated judge price is registered.
        if rounds > 1 {
            let judge_provider = agents
                .last()
                .map(|a| a.provider_id.clone())
                .unwrap_or_else(|| ProviderId::new("judge"));
            let judge_price = self.price_of(&judge_provider);
            let judge_rounds = (rounds.saturating_sub(1)) as u64;
            let per_judge_input = input_tokens + ROUND_OVERHEAD_TOKENS * (agents.len() as u64 + 1);
            for _ in 0..judge_rounds {
                tokens.add(TokenUsage::new(
                    per_judge_input,
                    ESTIMATED_OUTPUT_TOKENS_PER_CALL,
                ));
                usd += cost_usd(judge_price, per_judge_input, ESTIMATED_OUTPUT_TOKENS_PER_CALL);
            }
            // Round 3 also re-dispatches every agent for cross-examination.
            if rounds > 2 {
                for agent in agents {
                    let price = self.price_of(&agent.provider_id);
                    let round_input = input_tokens + ROUND_OVERHEAD_TOKENS * 2;
                    tokens.add(TokenUsage::new(round_input, ESTIMATED_OUTPUT_TOKENS_PER_CALL));
                    usd += cost_usd(price, round_input, ESTIMATED_OUTPUT_TOKENS_PER_CALL);
                }
            }
        }

        CostEstimate { tokens, usd }
    }
}

fn cost_usd(price: ModelPrice, input: u64, output: u64) -> f64 {
    (input as f64 / 1000.0) * price.input_per_1k + (output as f64 / 1000.0) * price.output_per_1k
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents() -> Vec<AgentDescriptor> {
        vec![
            AgentDescriptor::new("a1", "Advisor One", "acme-a"),
            AgentDescriptor::new("a2", "Advisor Two", "acme-b"),
            AgentDescriptor::new("a3", "Advisor Three", "acme-c"),
        ]
    }

    #[test]
    fn estimate_scales_with_round_count() {
        let table = PriceTable::new();
        let question = Question::new("Should we ship the v2 API?");
        let one_round = table.estimate(&question, &agents(), 1);
        let four_rounds = table.estimate(&question, &agents(), 4);
        assert!(four_rounds.usd > one_round.usd);
        assert!(four_rounds.tokens.total > one_round.tokens.total);
    }

    #[test]
    fn unknown_provider_uses_default_price() {
        let table = PriceTable::new();
        let price = table.price_of(&ProviderId::new("unregistered"));
        assert_eq!(price.input_per_1k, 0.01);
    }

    #[test]
    fn zero_agents_yields_zero_cost() {
        let table = PriceTable::new();
        let question = Question::new("anything");
        let estimate = table.estimate(&question, &[], 4);
        assert_eq!(estimate.tokens.total, 0);
        assert_eq!(estimate.usd, 0.0);
    }
}
