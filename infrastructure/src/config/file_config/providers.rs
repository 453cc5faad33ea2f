//! Provider registry configuration from TOML (`[[providers]]` sections)

use conclave_domain::provider::Tier;
use serde::{Deserialize, Serialize};

/// One registered remote inference endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProviderEntry {
    /// Stable provider id, matched against `AgentDescriptor.provider_id`.
    pub id: String,
    /// Base URL of the provider's chat-completion endpoint.
    pub base_url: String,
    /// Environment variable holding the bearer/API key.
    pub api_key_env: String,
    /// Cost/capability band used for hedge backup selection: "t1", "t2", "t3".
    #[serde(default = "default_tier")]
    pub tier: String,
}

fn default_tier() -> String {
    "t2".to_string()
}

impl FileProviderEntry {
    pub fn parse_tier(&self) -> Tier {
        match self.tier.to_lowercase().as_str() {
            "t1" => Tier::T1,
            "t3" => Tier::T3,
            _ => Tier::T2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub providers: Vec<FileProviderEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tier_falls_back_to_t2() {
        let entry = FileProviderEntry {
            id: "acme".into(),
            base_url: "https://example.invalid".into(),
            api_key_env: "ACME_API_KEY".into(),
            tier: "bogus".into(),
        };
        assert_eq!(entry.parse_tier(), Tier::T2);
    }

    #[test]
    fn recognizes_t1_and_t3() {
        let mut entry = FileProviderEntry {
            id: "acme".into(),
            base_url: "https://example.invalid".into(),
            api_key_env: "ACME_API_KEY".into(),
            tier: "t1".into(),
        };
        assert_eq!(entry.parse_tier(), Tier::T1);
        entry.tier = "t3".into();
        assert_eq!(entry.parse_tier(), Tier::T3);
    }
}
