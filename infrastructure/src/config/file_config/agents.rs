//! Advisor roster configuration from TOML (`[[agents]]` sections)

use conclave_domain::agent::AgentDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAgentEntry {
    pub id: String,
    pub display_name: String,
    pub provider_id: String,
    /// "judge" designates the agent that runs synthesis/cross-exam
    /// consolidation/verdict; at most one agent should carry it.
    pub role: Option<String>,
}

impl FileAgentEntry {
    pub fn to_domain(&self) -> AgentDescriptor {
        let mut descriptor =
            AgentDescriptor::new(self.id.clone(), self.display_name.clone(), self.provider_id.clone());
        if let Some(role) = &self.role {
            descriptor = descriptor.with_role(role.clone());
        }
        descriptor
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub agents: Vec<FileAgentEntry>,
}

impl FileAgentsConfig {
    pub fn to_domain(&self) -> Vec<AgentDescriptor> {
        self.agents.iter().map(FileAgentEntry::to_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_role_carries_through_to_domain() {
        let entry = FileAgentEntry {
            id: "judge".into(),
            display_name: "Judge".into(),
            provider_id: "acme-premium".into(),
            role: Some("judge".into()),
        };
        assert_eq!(entry.to_domain().role.as_deref(), Some("judge"));
    }

    #[test]
    fn roster_preserves_declaration_order() {
        let config = FileAgentsConfig {
            agents: vec![
                FileAgentEntry {
                    id: "a1".into(),
                    display_name: "Advisor One".into(),
                    provider_id: "acme-a".into(),
                    role: None,
                },
                FileAgentEntry {
                    id: "a2".into(),
                    display_name: "Advisor Two".into(),
                    provider_id: "acme-b".into(),
                    role: None,
                },
            ],
        };
        let agents = config.to_domain();
        assert_eq!(agents[0].id.as_str(), "a1");
        assert_eq!(agents[1].id.as_str(), "a2");
    }
}
