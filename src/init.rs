//! Default configuration for `--init`

use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE_NAME;
use crate::error::{Result, SyncError};

/// Default configuration template
pub const DEFAULT_CONFIG: &str = r#"# Template Sync Configuration
# Declares where the project template lives and how each of its files is
# brought into this project when running `template-sync`.
#
# Patterns are globs relative to the repository root:
#   *   matches within a single path segment
#   **  matches across directories
#   dir/ matches everything under dir
#
# A file is handled by the first category it matches, in this order:
#   exclude > overwrite > merge > create_if_missing
# Files matching nothing are left alone.

template:
  repository: https://github.com/your-org/go-service-template.git
  branch: main

# Always replaced by the template version (local copy is backed up first)
overwrite:
  - .gitignore
  - .golangci.yml
  - .github/workflows/*.yml

# Never overwritten: when the local file differs, the template version is
# written next to it as <file>.template-merge for manual reconciliation
merge:
  - Makefile
  - Dockerfile
  - docker-compose.yml

# Provisioned only when missing locally
create_if_missing:
  - docs/
  - .env.example

# Never touched
exclude:
  - go.mod
  - go.sum
  - internal/domain/**
  - internal/usecases/**

hooks:
  # Shell commands run from the project root; a failing hook is reported
  # but does not stop the sync
  pre_sync: []
  post_sync: [] # e.g. ["go mod tidy", "make fmt"]

version_file: .template-version

backup:
  enabled: true
  directory: .template-backups
"#;

/// Write the default configuration into `project_root`.
///
/// Returns the config path and whether it was written; an existing file is
/// kept unless `force` is set.
pub fn init(project_root: &Path, force: bool) -> Result<(PathBuf, bool)> {
    let config_path = project_root.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        println!(
            "  {} Config already exists: {} (use --force to overwrite)",
            "!".yellow(),
            config_path.display()
        );
        return Ok((config_path, false));
    }

    if !project_root.exists() {
        fs::create_dir_all(project_root).map_err(|e| SyncError::io(project_root, e))?;
    }
    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| SyncError::io(&config_path, e))?;
    println!("  {} Created: {}", "✔".green(), config_path.display());

    Ok((config_path, true))
}
