//! Consultation options — an explicit record, not an open map, so that
//! unrecognised options fail loudly at the config boundary rather than
//! being silently ignored (spec's "dynamic config object" design note).

use serde::{Deserialize, Serialize};

/// Which fan-out the facade should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// All four rounds.
    #[default]
    Consult,
    /// Round 1 only.
    Quick,
}

impl Mode {
    pub fn max_rounds(self) -> u8 {
        match self {
            Mode::Consult => 4,
            Mode::Quick => 1,
        }
    }
}

/// Options accepted by [`crate::consultation::result::ConsultationResult`]'s
/// producing use case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationOptions {
    pub mode: Mode,
    /// Disables artifact filtering when true.
    pub verbose: bool,
    pub max_rounds: u8,
    /// `0` disables the overall deadline.
    pub timeout_ms: u64,
    /// Whether prompts (cost gate, pulse, hedge substitution) may be shown.
    pub interactive: bool,
    pub project_path: Option<String>,
    /// Pre-approved cost acceptance for non-interactive mode. Must be
    /// explicit; never defaulted when `interactive` is false.
    pub cost_consent: Option<bool>,
}

impl Default for ConsultationOptions {
    fn default() -> Self {
        let mode = Mode::default();
        Self {
            mode,
            verbose: false,
            max_rounds: mode.max_rounds(),
            timeout_ms: 0,
            interactive: true,
            project_path: None,
            cost_consent: None,
        }
    }
}
