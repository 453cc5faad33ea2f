//! Interactive pulse watchdog configuration from TOML (`[pulse]` section)

use std::time::Duration;

use conclave_application::PulseConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePulseConfig {
    /// Milliseconds of wall-clock wait before prompting "keep waiting?".
    pub threshold_ms: u64,
}

impl Default for FilePulseConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 60_000,
        }
    }
}

impl FilePulseConfig {
    pub fn to_domain(&self) -> PulseConfig {
        PulseConfig {
            threshold: Duration::from_millis(self.threshold_ms),
        }
    }
}
