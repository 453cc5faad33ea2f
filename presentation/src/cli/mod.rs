//! Command-line argument parsing.

pub mod commands;

pub use commands::Cli;
