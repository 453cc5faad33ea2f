//! Configuration file loading for Conclave.
//!
//! Handles file I/O and merging of configuration from multiple sources. The
//! priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./conclave.toml` or `./.conclave.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
//! 4. Fallback: `~/.config/conclave/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAgentEntry, FileAgentsConfig, FileConfig, FileCostConfig, FileHealthConfig,
    FileHedgeConfig, FileModelPrice, FileOutputConfig, FileOutputFormat, FilePulseConfig,
    FileProviderEntry, FileProvidersConfig,
};
pub use loader::ConfigLoader;
