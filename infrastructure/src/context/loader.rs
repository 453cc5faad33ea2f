//! Local file system project context adapter.
//!
//! Grounded on `infrastructure/src/context/loader.rs::LocalContextLoader` in
//! the teacher, trimmed to the single `ProjectContextProducer` contract the
//! core actually consumes: an opaque prose block built from whatever known
//! project files exist, never a structured project-type classification.

use std::path::Path;

use async_trait::async_trait;
use conclave_application::ports::project_context::{ProjectContextError, ProjectContextProducer};
use tracing::debug;

/// Files checked, in priority/concatenation order, relative to the project
/// root passed to [`ProjectContextProducer::load`].
const KNOWN_FILES: &[&str] = &["CLAUDE.md", "README.md", "Cargo.toml", "package.json"];

/// Reads known context files from the local file system and concatenates
/// them into one prose block, each prefixed with its relative path.
#[derive(Debug, Clone, Default)]
pub struct LocalContextLoader;

impl LocalContextLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProjectContextProducer for LocalContextLoader {
    async fn load(&self, path: &str) -> Result<String, ProjectContextError> {
        let root = Path::new(path);
        if !root.is_dir() {
            return Err(ProjectContextError::ReadFailed {
                path: path.to_string(),
                reason: "not a directory".to_string(),
            });
        }

        let mut blocks = Vec::new();
        for file in KNOWN_FILES {
            let file_path = root.join(file);
            if !file_path.is_file() {
                continue;
            }
            match tokio::fs::read_to_string(&file_path).await {
                Ok(content) if !content.trim().is_empty() => {
                    blocks.push(format!("## {}\n\n{}", file, content.trim()));
                }
                Ok(_) => debug!("skipping empty context file: {:?}", file_path),
                Err(e) => {
                    return Err(ProjectContextError::ReadFailed {
                        path: file_path.display().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(blocks.join("\n\n---\n\n"))
    }
}
