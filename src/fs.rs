//! File system utilities.

use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, SyncError};

/// Name of the version-control metadata directory skipped in snapshots.
const VCS_DIR: &str = ".git";

/// List every regular file under `root`, relative to it, in walk order.
///
/// The snapshot's own `.git` directory is never descended into. Symlinks are
/// not followed and not listed.
pub fn snapshot_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_name() == VCS_DIR && e.file_type().is_dir()));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            let io = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            SyncError::io(path, io)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }

    Ok(files)
}

/// Drop `.` segments so `./.template-backups/` and `.template-backups`
/// compare equal against snapshot paths.
pub fn normalize_relative(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Compare two files byte for byte.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let meta_a = fs::metadata(a).map_err(|e| SyncError::io(a, e))?;
    let meta_b = fs::metadata(b).map_err(|e| SyncError::io(b, e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let left = fs::read(a).map_err(|e| SyncError::io(a, e))?;
    let right = fs::read(b).map_err(|e| SyncError::io(b, e))?;
    Ok(left == right)
}

/// Copy `src` to `dst`, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }

    fs::copy(src, dst).map_err(|e| SyncError::io(dst, e))?;
    Ok(())
}
