//! Application layer for the debate core.
//!
//! Use cases and port definitions. Depends only on the domain layer; every
//! collaborator (providers, project context, interactive prompts) is
//! injected through a port defined here.

pub mod cost_gate;
pub mod event_bus;
pub mod health;
pub mod hedge;
pub mod ports;
pub mod pulse;
pub mod use_cases;

pub use cost_gate::{CostGate, CostGateConfig};
pub use event_bus::EventBus;
pub use health::{HealthMonitor, HealthMonitorConfig};
pub use hedge::{AgentResponse, HedgeConfig, HedgedRequestManager};
pub use pulse::{Pulse, PulseConfig};
pub use use_cases::{Conclave, RunConsultationUseCase};
