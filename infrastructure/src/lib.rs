//! Infrastructure layer for Conclave.
//!
//! Adapters implementing the ports the application layer defines:
//! configuration file loading, the local project-context reader, the JSONL
//! event logger, and an example HTTP `ProviderPort` adapter.

pub mod config;
pub mod context;
pub mod logging;
pub mod providers;

pub use config::{
    ConfigLoader, FileAgentEntry, FileAgentsConfig, FileConfig, FileCostConfig, FileHealthConfig,
    FileHedgeConfig, FileModelPrice, FileOutputConfig, FileOutputFormat, FilePulseConfig,
    FileProviderEntry, FileProvidersConfig,
};
pub use context::LocalContextLoader;
pub use logging::EventLogger;
pub use providers::HttpProviderAdapter;
