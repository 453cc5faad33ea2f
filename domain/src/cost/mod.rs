//! Pre-flight cost estimation.

pub mod estimate;

pub use estimate::{CostEstimate, PriceTable, TokenUsage};
