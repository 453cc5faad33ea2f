//! Progress reporting for a running consultation.
//!
//! Grounded on the teacher's `ProgressReporter`/`SimpleProgress` pair
//! (`indicatif::MultiProgress` + `colored::Colorize`), generalized from a
//! `ProgressNotifier` port implementation to a plain event-bus listener:
//! the application layer has no progress port, so these attach directly to
//! [`EventBus`] instead.

use std::sync::{Arc, Mutex};

use colored::Colorize;
use conclave_application::event_bus::EventBus;
use conclave_domain::event::Event;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

fn round_display_name(round: u8) -> &'static str {
    match round {
        1 => "Round 1: Independent Answers",
        2 => "Round 2: Synthesis",
        3 => "Round 3: Cross-Examination",
        4 => "Round 4: Verdict",
        _ => "Round",
    }
}

fn round_short_name(round: u8) -> String {
    format!("Round {round}")
}

/// Reports progress during consultation execution with `indicatif` spinners,
/// one per round. Attach to an [`EventBus`] via [`ProgressReporter::attach`].
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap()
    }

    /// Subscribe this reporter to an event bus. The reporter must be held in
    /// an `Arc` because the subscribed closure owns a clone of it.
    pub fn attach(self: &Arc<Self>, bus: &EventBus) {
        let reporter = Arc::clone(self);
        bus.subscribe(move |event| reporter.handle(event));
    }

    fn handle(&self, event: &Event) {
        match event {
            Event::RoundStart { round } => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.set_prefix(round_display_name(*round));
                pb.set_message("starting...");
                pb.enable_steady_tick(std::time::Duration::from_millis(120));
                *self.round_bar.lock().unwrap() = Some(pb);
            }
            Event::AgentCompleted {
                agent_name,
                success,
                ..
            } => {
                if let Some(pb) = self.round_bar.lock().unwrap().as_ref() {
                    let status = if *success {
                        format!("{} {}", "v".green(), agent_name)
                    } else {
                        format!("{} {}", "x".red(), agent_name)
                    };
                    pb.set_message(status);
                    pb.inc(1);
                }
            }
            Event::RoundCompleted { round, .. } => {
                if let Some(pb) = self.round_bar.lock().unwrap().take() {
                    pb.finish_with_message(format!("{} complete", round_short_name(*round).green()));
                }
            }
            Event::ConsultationCompleted { .. } => {
                if let Some(pb) = self.round_bar.lock().unwrap().take() {
                    pb.finish_and_clear();
                }
            }
            _ => {}
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-text progress, no fancy UI. Useful under `--quiet` or when stderr
/// isn't a TTY.
pub struct SimpleProgress;

impl SimpleProgress {
    pub fn new() -> Self {
        Self
    }

    pub fn attach(self: &Arc<Self>, bus: &EventBus) {
        let reporter = Arc::clone(self);
        bus.subscribe(move |event| reporter.handle(event));
    }

    fn handle(&self, event: &Event) {
        match event {
            Event::RoundStart { round } => {
                println!("{} {}", "->".cyan(), round_display_name(*round).bold());
            }
            Event::AgentCompleted {
                agent_name,
                success,
                ..
            } => {
                if *success {
                    println!("  {} {}", "v".green(), agent_name);
                } else {
                    println!("  {} {} (failed)", "x".red(), agent_name);
                }
            }
            Event::RoundCompleted { .. } => println!(),
            _ => {}
        }
    }
}

impl Default for SimpleProgress {
    fn default() -> Self {
        Self::new()
    }
}
