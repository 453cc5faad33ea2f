//! Port definitions (interfaces for external adapters).
//!
//! Ports define the contracts infrastructure adapters must implement.

pub mod interaction;
pub mod project_context;
pub mod provider_port;

pub use interaction::{HedgeRecoveryChoice, InteractionPort};
pub use project_context::{ProjectContextError, ProjectContextProducer};
pub use provider_port::{ChatMessage, ChatOptions, ChatResponse, ProviderPort, Role};
