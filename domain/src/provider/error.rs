//! Provider Port error contract (spec §4.1), and the user-recovery reasons
//! recorded against a failed agent response.

use serde::{Deserialize, Serialize};

/// Kind of failure a Provider Port call can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Transport,
    RateLimited,
    Timeout,
    InvalidResponse,
    Auth,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn cancelled() -> Self {
        Self::new(ProviderErrorKind::Cancelled, "request cancelled", false)
    }

    pub fn user_cancelled_via_pulse() -> Self {
        Self::new(
            ProviderErrorKind::Cancelled,
            "user_cancelled",
            false,
        )
    }

    pub fn user_skipped() -> Self {
        Self::new(
            ProviderErrorKind::Cancelled,
            "user_skip",
            false,
        )
    }
}
