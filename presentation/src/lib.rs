//! Presentation layer for Conclave.
//!
//! CLI argument parsing, console/JSON output formatting, event-bus-driven
//! progress reporting, and a stdin-backed interactive prompt adapter.

pub mod cli;
pub mod interaction;
pub mod output;
pub mod progress;

pub use cli::Cli;
pub use interaction::StdinInteraction;
pub use output::{ConsoleFormatter, OutputFormatter};
pub use progress::{ProgressReporter, SimpleProgress};
