//! The hedged request manager.

pub mod manager;

pub use manager::{AgentResponse, HedgeConfig, HedgedRequestManager};
