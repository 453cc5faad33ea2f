//! Output formatter trait.
//!
//! Grounded on `presentation/src/output/formatter.rs`'s `OutputFormatter`
//! trait in the teacher, generalized from `QuorumResult`'s three-phase
//! shape to the debate core's four-round [`ConsultationResult`].

use conclave_domain::consultation::ConsultationResult;

/// Formats a finished consultation for display.
pub trait OutputFormatter {
    /// Format every round's artifacts plus the verdict.
    fn format(&self, result: &ConsultationResult) -> String;

    /// Format as pretty-printed JSON.
    fn format_json(&self, result: &ConsultationResult) -> String;

    /// Format only the final recommendation/confidence/dissent.
    fn format_verdict_only(&self, result: &ConsultationResult) -> String;
}
