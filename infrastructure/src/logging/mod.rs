//! Logging infrastructure: a JSONL event sink subscribable on an `EventBus`.

mod jsonl_logger;

pub use jsonl_logger::EventLogger;
