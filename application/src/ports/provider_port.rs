//! Provider Port (spec §4.1) — speaks to a single remote model.
//!
//! Grounded on `application/src/ports/llm_gateway.rs`'s `LlmGateway`/
//! `LlmSession` async-trait shape in the teacher, collapsed to one
//! stateless `chat` call since the debate core has no multi-turn session
//! concept — every round call is independent.

use async_trait::async_trait;
use conclave_domain::provider::ProviderError;
use conclave_domain::{AgentDescriptor, ProviderId};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Clone, Default)]
pub struct ChatOptions {
    pub cancel_token: Option<CancellationToken>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Speaks to one remote model. Implementations live in the infrastructure
/// layer; this trait carries no hidden state beyond network I/O.
#[async_trait]
pub trait ProviderPort: Send + Sync {
    fn provider_id(&self) -> ProviderId;

    async fn chat(
        &self,
        messages: &[ChatMessage],
        system_prompt: Option<&str>,
        options: ChatOptions,
    ) -> Result<ChatResponse, ProviderError>;

    /// Optional capability: a native health-check cheaper than a synthetic
    /// ping chat. `None` means the capability is absent and the caller
    /// should fall back to a ping.
    async fn health_check(&self) -> Option<bool> {
        None
    }
}

/// Registry of live provider adapters keyed by provider id, constructed
/// once from [`AgentDescriptor`] configuration at facade entry.
pub type ProviderRegistry = std::collections::HashMap<ProviderId, std::sync::Arc<dyn ProviderPort>>;

/// Resolve the provider backing an agent, or panic — a misconfigured agent
/// (provider id absent from the registry) is a programmer error surfaced
/// at wiring time, not a runtime condition the core should recover from.
pub fn provider_for<'a>(registry: &'a ProviderRegistry, agent: &AgentDescriptor) -> &'a (dyn ProviderPort + 'a) {
    registry
        .get(&agent.provider_id)
        .unwrap_or_else(|| panic!("no provider registered for {}", agent.provider_id))
        .as_ref()
}
