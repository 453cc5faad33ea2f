//! Event-bus-driven progress reporting.

pub mod reporter;

pub use reporter::{ProgressReporter, SimpleProgress};
