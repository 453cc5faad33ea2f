//! Agent and provider identity.
//!
//! An [`AgentDescriptor`] is stable for the duration of one consultation:
//! created from injected configuration at facade entry, never mutated, and
//! dropped with the orchestrator. This module deliberately keeps
//! [`ProviderId`] an open newtype rather than a closed enum — the core does
//! not decide which models exist, configuration does.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a remote inference endpoint (e.g. a model name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ProviderId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Identity of an advisor participating in a consultation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// `{ id, displayName, providerId, role? }` — stable for one consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub display_name: String,
    pub provider_id: ProviderId,
    pub role: Option<String>,
}

impl AgentDescriptor {
    pub fn new(
        id: impl Into<AgentId>,
        display_name: impl Into<String>,
        provider_id: impl Into<ProviderId>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            provider_id: provider_id.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_descriptor_without_role() {
        let agent = AgentDescriptor::new("a1", "Advisor One", "acme-gpt");
        assert_eq!(agent.id.as_str(), "a1");
        assert!(agent.role.is_none());
    }

    #[test]
    fn agent_descriptor_with_role() {
        let agent = AgentDescriptor::new("judge", "Judge", "acme-gpt-premium").with_role("judge");
        assert_eq!(agent.role.as_deref(), Some("judge"));
    }

    #[test]
    fn provider_id_display_roundtrip() {
        let id = ProviderId::new("acme-gpt");
        assert_eq!(id.to_string(), "acme-gpt");
    }
}
