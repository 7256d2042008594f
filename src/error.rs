use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Errors that abort the compile of a single scene file.
///
/// Everything recoverable (unknown object types, failing asset lookups,
/// missing section tags) is reported as a `Diagnostic` instead.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Not a scene file: {0}")]
    Format(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}
