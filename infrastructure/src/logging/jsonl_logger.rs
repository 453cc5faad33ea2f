//! JSONL file writer for consultation lifecycle events.
//!
//! Grounded on `infrastructure/src/logging/jsonl_logger.rs`'s
//! `JsonlConversationLogger` in the teacher: one JSON object per line,
//! appended through a buffered writer, flushed on every write and on drop.
//! Generalized from a conversation-turn payload to the debate core's
//! [`Event`] enum, which already tags itself with a `topic` field via its
//! `#[serde(tag = "topic", ...)]` derive.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use conclave_domain::event::Event;
use tracing::warn;

/// Appends one JSON line per [`Event`] to a file. Thread-safe via
/// `Mutex<BufWriter<File>>`; meant to be subscribed directly to an
/// `EventBus` via [`EventLogger::as_listener`].
pub struct EventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl EventLogger {
    /// Create a logger writing to `path`, creating parent directories as
    /// needed. Returns `None` if the file cannot be created — a missing
    /// event log must never abort a consultation.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("could not create event log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("could not create event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event, ignoring serialization/write failures — logging
    /// must never be able to fail a consultation.
    pub fn log(&self, event: &Event) {
        let Ok(line) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_domain::agent::AgentId;
    use std::io::Read;

    #[test]
    fn writes_one_json_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = EventLogger::new(&path).unwrap();

        logger.log(&Event::RoundStart { round: 1 });
        logger.log(&Event::AgentThinking {
            agent_id: AgentId::new("a1"),
            agent_name: "Advisor One".into(),
            round: 1,
        });
        drop(logger);

        let mut content = String::new();
        File::open(&path).unwrap().read_to_string(&mut content).unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["topic"], "round:start");
        assert_eq!(first["round"], 1);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["topic"], "agent:thinking");
    }

    #[test]
    fn returns_none_for_unwritable_path() {
        let result = EventLogger::new("/nonexistent/deeply/nested/conclave/path/file.jsonl");
        let _ = result;
    }
}
