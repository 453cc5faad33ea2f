//! Stdin-backed [`InteractionPort`]: the interactive prompts a human sees
//! at a terminal for cost consent, hedge-failure recovery, and the pulse
//! watchdog's "still there?" check.
//!
//! Grounded on the teacher's REPL-style `std::io::stdin` prompt reads,
//! wrapped in `tokio::task::spawn_blocking` since stdin reads block and
//! [`InteractionPort`] is async.

use std::io::Write;

use async_trait::async_trait;
use colored::Colorize;
use conclave_application::ports::interaction::{HedgeRecoveryChoice, InteractionPort};
use conclave_domain::agent::AgentId;
use conclave_domain::cost::CostEstimate;

/// Reads a yes/no answer from stdin, defaulting to `default` on empty input
/// or an unreadable terminal (e.g. piped stdin with no more lines).
fn prompt_yes_no(prompt: &str, default: bool) -> bool {
    let suffix = if default { "[Y/n]" } else { "[y/N]" };
    print!("{} {} ", prompt, suffix.dimmed());
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return default;
    }
    match line.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

/// Prompts at a real terminal via `std::io::stdin`.
pub struct StdinInteraction;

impl StdinInteraction {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdinInteraction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractionPort for StdinInteraction {
    async fn confirm_cost(&self, estimate: &CostEstimate, threshold_usd: f64) -> bool {
        let prompt = format!(
            "{} estimated ${:.4} exceeds the ${:.4} threshold. Proceed?",
            "Cost:".yellow().bold(),
            estimate.usd,
            threshold_usd
        );
        tokio::task::spawn_blocking(move || prompt_yes_no(&prompt, false))
            .await
            .unwrap_or(false)
    }

    async fn choose_hedge_recovery(&self, agent_id: &AgentId) -> HedgeRecoveryChoice {
        let agent_id = agent_id.clone();
        tokio::task::spawn_blocking(move || {
            println!(
                "{} every provider for {} failed. (s)ubstitute, s(k)ip, or (a)bort?",
                "Hedge:".red().bold(),
                agent_id
            );
            print!("> ");
            let _ = std::io::stdout().flush();
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                return HedgeRecoveryChoice::Abort;
            }
            match line.trim().to_lowercase().as_str() {
                "s" | "substitute" => HedgeRecoveryChoice::Substitute,
                "k" | "skip" => HedgeRecoveryChoice::Skip,
                _ => HedgeRecoveryChoice::Abort,
            }
        })
        .await
        .unwrap_or(HedgeRecoveryChoice::Abort)
    }

    async fn confirm_continue_waiting(&self, agent_id: &AgentId, elapsed_seconds: u64) -> bool {
        let prompt = format!(
            "{} {} has been running for {}s. Keep waiting?",
            "Pulse:".yellow().bold(),
            agent_id,
            elapsed_seconds
        );
        tokio::task::spawn_blocking(move || prompt_yes_no(&prompt, true))
            .await
            .unwrap_or(true)
    }
}
