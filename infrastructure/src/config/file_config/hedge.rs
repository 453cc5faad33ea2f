//! Hedged request configuration from TOML (`[hedge]` section)

use std::time::Duration;

use conclave_application::HedgeConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHedgeConfig {
    /// Milliseconds to wait for the primary before racing a backup.
    pub stagger_delay_ms: u64,
}

impl Default for FileHedgeConfig {
    fn default() -> Self {
        Self {
            stagger_delay_ms: 10_000,
        }
    }
}

impl FileHedgeConfig {
    pub fn to_domain(&self) -> HedgeConfig {
        HedgeConfig {
            stagger_delay: Duration::from_millis(self.stagger_delay_ms),
        }
    }
}
