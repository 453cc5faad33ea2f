//! Command-line argument surface.
//!
//! Grounded on the teacher's `cli/src/main.rs` argument shape (question
//! positional, `--model` repeated, `--moderator`, `--quiet`, `-v` count),
//! generalized from Quorum's flat model list to the debate core's
//! judge-rather-than-moderator vocabulary. This is ambient wiring for a
//! single entry point, not a general-purpose command framework.

use clap::Parser;
use conclave_domain::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "conclave", about = "Run a multi-agent deliberation over a question")]
pub struct Cli {
    /// The question to put to the advisor agents.
    pub question: Option<String>,

    /// Override the judge agent (by agent id) used for rounds 2 and 4.
    #[arg(long = "judge")]
    pub judge: Option<String>,

    /// Path to a config file, taking priority over the project/global ones.
    #[arg(long = "config")]
    pub config: Option<std::path::PathBuf>,

    /// Output format: full, verdict, or json.
    #[arg(long = "output", default_value_t = OutputFormat::default())]
    pub output: OutputFormat,

    /// Round 1 only, skipping synthesis/cross-exam/verdict.
    #[arg(long = "quick")]
    pub quick: bool,

    /// Disable artifact filtering between rounds.
    #[arg(long = "verbose-artifacts")]
    pub verbose_artifacts: bool,

    /// Suppress progress output.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbosity: -v info, -vv debug, -vvv trace.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Non-interactive mode: never prompt, auto-accept cost/hedge/pulse.
    #[arg(long = "yes")]
    pub yes: bool,

    /// Non-interactive mode: never prompt, auto-reject cost/hedge.
    #[arg(long = "no-interactive")]
    pub no_interactive: bool,

    /// Overall deadline in milliseconds; 0 disables it.
    #[arg(long = "timeout-ms", default_value_t = 0)]
    pub timeout_ms: u64,

    /// Path to the project whose context file should be attached.
    #[arg(long = "project", default_value = ".")]
    pub project: String,

    /// Append a JSONL event log to this path.
    #[arg(long = "event-log")]
    pub event_log: Option<std::path::PathBuf>,
}
