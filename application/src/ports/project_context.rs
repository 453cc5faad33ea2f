//! Project context collaborator port (spec §6).
//!
//! Grounded on `infrastructure/src/context/loader.rs`'s `LocalContextLoader`
//! shape in the teacher; the core only consumes an opaque prose block, it
//! never interprets the path or the project type.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectContextError {
    #[error("failed to read project context at {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

/// `load(path) -> contextText`, opaque to the scheduler.
#[async_trait]
pub trait ProjectContextProducer: Send + Sync {
    async fn load(&self, path: &str) -> Result<String, ProjectContextError>;
}

/// No project path was given; round 1's prompt carries no context block.
pub struct NoProjectContext;

#[async_trait]
impl ProjectContextProducer for NoProjectContext {
    async fn load(&self, _path: &str) -> Result<String, ProjectContextError> {
        Ok(String::new())
    }
}
