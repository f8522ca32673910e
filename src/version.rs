//! Version marker persistence and update status.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

/// Shown when no marker has been written yet
pub const NO_VERSION: &str = "none";

/// The persisted identifier of the last synced upstream snapshot
#[derive(Debug, Clone)]
pub struct VersionMarker {
    path: PathBuf,
}

impl VersionMarker {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current identifier; `None` when the marker is absent or blank.
    pub fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| SyncError::io(&self.path, e))?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    pub fn write(&self, version: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        fs::write(&self.path, format!("{}\n", version.trim()))
            .map_err(|e| SyncError::io(&self.path, e))
    }
}

/// Result of an update check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateStatus {
    pub current: Option<String>,
    pub latest: String,
    pub updates_available: bool,
}

impl UpdateStatus {
    pub fn new(current: Option<String>, latest: String) -> Self {
        let updates_available = current.as_deref() != Some(latest.as_str());
        Self {
            current,
            latest,
            updates_available,
        }
    }

    pub fn current_display(&self) -> &str {
        self.current.as_deref().unwrap_or(NO_VERSION)
    }
}
