//! Raw TOML configuration data types, split one file per concern.
//!
//! Deserialized directly via `figment`/`serde`, then converted to the
//! domain/application config types each component actually expects.
//! Malformed values (bad enum strings, wrong types) surface as ordinary
//! figment/serde deserialization errors — there is no separate structured
//! validation pass here (see DESIGN.md's config-validation decision).

mod agents;
mod cost;
mod health;
mod hedge;
mod output;
mod providers;
mod pulse;

pub use agents::{FileAgentEntry, FileAgentsConfig};
pub use cost::{FileCostConfig, FileModelPrice};
pub use health::FileHealthConfig;
pub use hedge::FileHedgeConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileProviderEntry, FileProvidersConfig};
pub use pulse::FilePulseConfig;

use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure), one section per
/// ambient concern plus the advisor roster and provider registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub health: FileHealthConfig,
    pub hedge: FileHedgeConfig,
    pub pulse: FilePulseConfig,
    pub cost: FileCostConfig,
    pub output: FileOutputConfig,
    pub providers: FileProvidersConfig,
    pub agents: FileAgentsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_full_config() {
        let toml_str = r#"
[health]
interval_ms = 15000
timeout_ms = 5000

[hedge]
stagger_delay_ms = 8000

[pulse]
threshold_ms = 45000

[cost]
threshold_usd = 2.0

[output]
format = "json"
color = false

[[providers]]
id = "acme-a"
base_url = "https://acme.invalid/v1/chat"
api_key_env = "ACME_API_KEY"
tier = "t1"

[[agents]]
id = "judge"
display_name = "Judge"
provider_id = "acme-a"
role = "judge"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.health.interval_ms, 15_000);
        assert_eq!(config.hedge.stagger_delay_ms, 8_000);
        assert_eq!(config.pulse.threshold_ms, 45_000);
        assert_eq!(config.cost.threshold_usd, 2.0);
        assert!(!config.output.color);
        assert_eq!(config.providers.providers.len(), 1);
        assert_eq!(config.agents.agents.len(), 1);
        assert_eq!(config.agents.agents[0].role.as_deref(), Some("judge"));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let toml_str = r#"
[cost]
threshold_usd = 5.0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cost.threshold_usd, 5.0);
        assert_eq!(config.health.interval_ms, 30_000);
        assert!(config.agents.agents.is_empty());
    }

    #[test]
    fn default_config_has_no_agents_or_providers() {
        let config = FileConfig::default();
        assert!(config.agents.agents.is_empty());
        assert!(config.providers.providers.is_empty());
    }
}
