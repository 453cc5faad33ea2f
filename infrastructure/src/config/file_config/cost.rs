//! Cost gate and price table configuration from TOML (`[cost]` section)

use std::collections::HashMap;

use conclave_application::CostGateConfig;
use conclave_domain::cost::estimate::{ModelPrice, PriceTable};
use conclave_domain::ProviderId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FileModelPrice {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCostConfig {
    /// USD threshold above which the cost gate requires explicit consent.
    pub threshold_usd: f64,
    /// Per-provider price overrides; unlisted providers use the domain
    /// default price.
    pub prices: HashMap<String, FileModelPrice>,
}

impl Default for FileCostConfig {
    fn default() -> Self {
        Self {
            threshold_usd: 1.0,
            prices: HashMap::new(),
        }
    }
}

impl FileCostConfig {
    pub fn to_gate_config(&self) -> CostGateConfig {
        CostGateConfig {
            threshold_usd: self.threshold_usd,
        }
    }

    pub fn to_price_table(&self) -> PriceTable {
        let mut table = PriceTable::new();
        for (provider_id, price) in &self.prices {
            table.insert(
                ProviderId::new(provider_id.clone()),
                ModelPrice {
                    input_per_1k: price.input_per_1k,
                    output_per_1k: price.output_per_1k,
                },
            );
        }
        table
    }
}
