//! Per-run backups of files about to be replaced.
//!
//! Each run gets its own timestamped directory under the backup root. The
//! directory is only created once the first file is saved, so a run that
//! changes nothing (or fails before touching anything) leaves no trace.

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::copy_file;

#[derive(Debug)]
pub struct BackupSet {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl BackupSet {
    /// Allocate a fresh, timestamped directory under `root`.
    pub fn new(root: &Path) -> Self {
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let mut dir = root.join(&stamp);
        let mut n = 1;
        while dir.exists() {
            dir = root.join(format!("{}-{}", stamp, n));
            n += 1;
        }
        Self {
            dir,
            saved: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Relative paths saved so far
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Copy `project_root/relative` into the backup at the same relative path.
    pub fn save(&mut self, project_root: &Path, relative: &Path) -> Result<PathBuf> {
        let target = self.dir.join(relative);
        copy_file(&project_root.join(relative), &target)?;
        self.saved.push(relative.to_path_buf());
        Ok(target)
    }
}
