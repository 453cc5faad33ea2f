//! Terminal-facing [`InteractionPort`](conclave_application::ports::interaction::InteractionPort) implementation.

pub mod stdin;

pub use stdin::StdinInteraction;
