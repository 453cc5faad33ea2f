//! The background provider health monitor.

pub mod monitor;

pub use monitor::{HealthMonitor, HealthMonitorConfig};
