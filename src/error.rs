//! Error taxonomy for template synchronization.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or malformed configuration. Raised before anything is touched.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required external tool is not available.
    #[error("{tool} is required but was not found on PATH ({hint})")]
    Dependency { tool: String, hint: String },

    /// The upstream template could not be reached or read.
    #[error("failed to fetch template from {source_url}: {reason}")]
    Fetch { source_url: String, reason: String },

    /// A hook exited non-zero. Never fatal; surfaced as a warning.
    #[error("hook `{command}` failed: {reason}")]
    Hook { command: String, reason: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn fetch(source_url: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::Fetch {
            source_url: source_url.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code used by the CLI for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Config(_) => 2,
            SyncError::Dependency { .. } => 3,
            SyncError::Fetch { .. } => 4,
            SyncError::Hook { .. } | SyncError::Io { .. } => 1,
        }
    }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
