//! Configuration parsing for template-sync
//!
//! Handles the YAML file that declares where the template lives and how
//! each upstream path is treated when synchronizing.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::patterns::Classifier;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = ".template-sync.yml";

/// Default version marker file name
pub const DEFAULT_VERSION_FILE: &str = ".template-version";

/// Default backup root directory
pub const DEFAULT_BACKUP_DIR: &str = ".template-backups";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Where the upstream template lives
    pub template: TemplateSource,

    /// Paths always replaced by the upstream version
    #[serde(default)]
    pub overwrite: Vec<String>,

    /// Paths that need conflict-aware handling
    #[serde(default)]
    pub merge: Vec<String>,

    /// Paths provisioned only when absent locally
    #[serde(default)]
    pub create_if_missing: Vec<String>,

    /// Paths never touched
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Shell commands run around file application
    #[serde(default)]
    pub hooks: HooksConfig,

    /// Version marker location (relative to the project root)
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Backup settings
    #[serde(default)]
    pub backup: BackupConfig,
}

/// Locator for the upstream template repository
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSource {
    /// Repository URL or local path
    pub repository: String,

    /// Branch or ref to fetch
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_version_file() -> String {
    DEFAULT_VERSION_FILE.to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HooksConfig {
    #[serde(default)]
    pub pre_sync: Vec<String>,

    #[serde(default)]
    pub post_sync: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_backup_dir")]
    pub directory: String,
}

fn default_true() -> bool {
    true
}

fn default_backup_dir() -> String {
    DEFAULT_BACKUP_DIR.to_string()
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_backup_dir(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content).map_err(|e| match e {
            SyncError::Config(msg) => {
                SyncError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: SyncConfig = serde_yaml::from_str(content)
            .map_err(|e| SyncError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.template.repository.trim().is_empty() {
            return Err(SyncError::Config(
                "template.repository must not be empty".to_string(),
            ));
        }
        if self.template.branch.trim().is_empty() {
            return Err(SyncError::Config(
                "template.branch must not be empty".to_string(),
            ));
        }
        if self.version_file.trim().is_empty() {
            return Err(SyncError::Config(
                "version_file must not be empty".to_string(),
            ));
        }
        // Compiling the classifier surfaces bad globs at load time.
        Classifier::from_config(self)?;
        Ok(())
    }

    /// Find configuration file by searching up from the start directory
    pub fn find_config(start_dir: &Path) -> Result<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }

            if !current.pop() {
                return Err(SyncError::Config(format!(
                    "could not find {} in {} or any parent directory",
                    CONFIG_FILE_NAME,
                    start_dir.display()
                )));
            }
        }
    }

    /// The project root is the directory holding the config file
    pub fn project_root(config_path: &Path) -> PathBuf {
        match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn version_file_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.version_file)
    }

    pub fn backup_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.backup.directory)
    }
}
