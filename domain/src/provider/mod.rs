//! Provider health classification and tier-based backup selection.

pub mod error;
pub mod health;
pub mod tier;

pub use error::{ProviderError, ProviderErrorKind};
pub use health::{HealthStatus, ProviderHealth, RollingWindow};
pub use tier::{BackupCandidates, Tier, TierMap};
