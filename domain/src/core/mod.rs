//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`] — a validated question posed to the debate core
//! - [`error::DomainError`] — domain-level errors and the error taxonomy
//! - [`string`] — UTF-8 safe truncation helpers used by the artifact filter

pub mod error;
pub mod question;
pub mod string;
