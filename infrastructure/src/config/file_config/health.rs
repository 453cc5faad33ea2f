//! Health monitor configuration from TOML (`[health]` section)

use std::time::Duration;

use conclave_application::HealthMonitorConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHealthConfig {
    /// Milliseconds between background probes of a registered provider.
    pub interval_ms: u64,
    /// Hard timeout for one probe.
    pub timeout_ms: u64,
}

impl Default for FileHealthConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            timeout_ms: 10_000,
        }
    }
}

impl FileHealthConfig {
    pub fn to_domain(&self) -> HealthMonitorConfig {
        HealthMonitorConfig {
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let config = FileHealthConfig::default();
        assert_eq!(config.interval_ms, 30_000);
        assert_eq!(config.timeout_ms, 10_000);
    }

    #[test]
    fn to_domain_converts_milliseconds_to_duration() {
        let config = FileHealthConfig {
            interval_ms: 5_000,
            timeout_ms: 2_000,
        };
        let domain = config.to_domain();
        assert_eq!(domain.interval, Duration::from_secs(5));
        assert_eq!(domain.timeout, Duration::from_secs(2));
    }
}
