//! Template synchronization engine
//!
//! Brings the files a project shares with its template back in line with
//! upstream: each upstream file is classified against the configured
//! categories and applied with the matching strategy, backing up anything
//! about to be replaced.

use colored::Colorize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::backup::BackupSet;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::fs::{copy_file, files_identical, normalize_relative, snapshot_files};
use crate::hooks::{CommandRunner, HookStage, ShellRunner, run_hooks};
use crate::patterns::{Category, Classifier, Strategy};
use crate::prompt::{Confirmer, TerminalConfirmer};
use crate::source::TemplateRepository;
use crate::version::{UpdateStatus, VersionMarker};

/// Suffix of the sibling file holding upstream content awaiting a manual merge
pub const MERGE_SUFFIX: &str = ".template-merge";

/// Options for the sync operation
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOptions {
    /// Show what would be done without making changes
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub force: bool,
    /// Show detailed output
    pub verbose: bool,
}

/// One upstream file as seen during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedFile {
    pub relative_path: PathBuf,
    pub category: Option<Category>,
    pub strategy: Strategy,
    pub local_exists: bool,
    /// Only computed when the strategy needs it (overwrite, merge)
    pub content_differs: Option<bool>,
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Created,
    Updated,
    Unchanged,
    /// Upstream content written (or already present) next to the local file
    MergePending,
    /// create_if_missing target already present locally
    Kept,
    Excluded,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed,
    /// The operator declined the confirmation; nothing was touched
    Declined,
}

/// Result of a sync operation
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub dry_run: bool,
    pub previous_version: Option<String>,
    pub version: Option<String>,
    pub created: Vec<PathBuf>,
    pub updated: Vec<PathBuf>,
    pub merge_pending: Vec<PathBuf>,
    pub unchanged: usize,
    pub kept: usize,
    pub excluded: usize,
    pub skipped: usize,
    pub backup_dir: Option<PathBuf>,
    pub hook_failures: Vec<String>,
}

impl SyncReport {
    fn new(outcome: SyncOutcome, dry_run: bool) -> Self {
        Self {
            outcome,
            dry_run,
            previous_version: None,
            version: None,
            created: Vec::new(),
            updated: Vec::new(),
            merge_pending: Vec::new(),
            unchanged: 0,
            kept: 0,
            excluded: 0,
            skipped: 0,
            backup_dir: None,
            hook_failures: Vec::new(),
        }
    }

    fn record(&mut self, path: &Path, action: FileAction) {
        match action {
            FileAction::Created => self.created.push(path.to_path_buf()),
            FileAction::Updated => self.updated.push(path.to_path_buf()),
            FileAction::MergePending => self.merge_pending.push(path.to_path_buf()),
            FileAction::Unchanged => self.unchanged += 1,
            FileAction::Kept => self.kept += 1,
            FileAction::Excluded => self.excluded += 1,
            FileAction::Skipped => self.skipped += 1,
        }
    }

    /// Number of project files the run wrote (or would write)
    pub fn changed(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

/// Performs template synchronization for one project
pub struct Syncer {
    config: SyncConfig,
    project_root: PathBuf,
    classifier: Classifier,
    repository: Box<dyn TemplateRepository>,
    runner: Box<dyn CommandRunner>,
    confirmer: Box<dyn Confirmer>,
}

impl Syncer {
    /// Create a syncer with the default shell runner and terminal prompt
    pub fn new(
        config: SyncConfig,
        project_root: PathBuf,
        repository: Box<dyn TemplateRepository>,
    ) -> Result<Self> {
        let classifier = Classifier::from_config(&config)?;
        Ok(Self {
            config,
            project_root,
            classifier,
            repository,
            runner: Box::new(ShellRunner),
            confirmer: Box::new(TerminalConfirmer),
        })
    }

    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_confirmer(mut self, confirmer: Box<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    /// Get the project root path
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the config
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn version_marker(&self) -> VersionMarker {
        VersionMarker::new(self.config.version_file_path(&self.project_root))
    }

    /// Compare the persisted marker with the latest upstream version.
    /// Touches nothing on disk.
    pub fn check_for_updates(&self) -> Result<UpdateStatus> {
        let current = self.version_marker().read()?;
        let latest = self.repository.latest_version()?;
        Ok(UpdateStatus::new(current, latest))
    }

    /// Perform the sync operation
    pub fn sync(&self, options: &SyncOptions) -> Result<SyncReport> {
        if !options.force && !options.dry_run {
            let prompt = format!(
                "Sync template files from {} into {}?",
                self.repository.locator(),
                self.project_root.display()
            );
            let confirmed = self
                .confirmer
                .confirm(&prompt)
                .map_err(|e| SyncError::io(&self.project_root, e))?;
            if !confirmed {
                return Ok(SyncReport::new(SyncOutcome::Declined, false));
            }
        }

        let mut report = SyncReport::new(SyncOutcome::Completed, options.dry_run);
        if options.dry_run {
            println!("{}", "Running in dry-run mode\n".cyan());
        }

        let marker = self.version_marker();
        report.previous_version = marker.read()?;

        let mut backups = if !options.dry_run && self.config.backup.enabled {
            Some(BackupSet::new(&self.config.backup_root(&self.project_root)))
        } else {
            None
        };

        let pre = run_hooks(
            self.runner.as_ref(),
            HookStage::PreSync,
            &self.config.hooks.pre_sync,
            &self.project_root,
            options.dry_run,
            options.verbose,
        );
        report.hook_failures.extend(pre.failed);

        let scratch = tempfile::Builder::new()
            .prefix("template-sync-")
            .tempdir()
            .map_err(|e| SyncError::io(std::env::temp_dir(), e))?;
        println!("  Fetching {} ...", self.repository.locator().dimmed());
        let version = self.repository.fetch(scratch.path())?;

        let protected = self.protected_paths();
        for relative in snapshot_files(scratch.path())? {
            let file = if protected.iter().any(|p| relative.starts_with(p)) {
                SyncedFile {
                    relative_path: relative,
                    category: Some(Category::Exclude),
                    strategy: Strategy::Skip,
                    local_exists: false,
                    content_differs: None,
                }
            } else {
                self.inspect(relative, scratch.path())?
            };

            tracing::debug!(
                path = %file.relative_path.display(),
                strategy = %file.strategy,
                local_exists = file.local_exists,
                "Classified template file"
            );

            let action = self.apply(&file, scratch.path(), &mut backups, options)?;
            report.record(&file.relative_path, action);
        }

        if !options.dry_run {
            marker.write(&version)?;
        }
        report.version = Some(version);

        let post = run_hooks(
            self.runner.as_ref(),
            HookStage::PostSync,
            &self.config.hooks.post_sync,
            &self.project_root,
            options.dry_run,
            options.verbose,
        );
        report.hook_failures.extend(post.failed);

        if let Err(e) = scratch.close() {
            tracing::warn!(error = %e, "Failed to remove template snapshot");
        }

        report.backup_dir = backups
            .filter(|b| !b.is_empty())
            .map(|b| b.dir().to_path_buf());

        Ok(report)
    }

    /// The tool's own state is never overwritten from upstream.
    fn protected_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![normalize_relative(Path::new(&self.config.version_file))];
        if self.config.backup.enabled {
            paths.push(normalize_relative(Path::new(&self.config.backup.directory)));
        }
        paths
    }

    fn inspect(&self, relative: PathBuf, snapshot: &Path) -> Result<SyncedFile> {
        let classification = self.classifier.classify(&relative);
        let local = self.project_root.join(&relative);
        let local_exists = local.exists();

        let content_differs = match classification.strategy {
            Strategy::Overwrite | Strategy::Merge if local_exists => {
                Some(!files_identical(&local, &snapshot.join(&relative))?)
            }
            _ => None,
        };

        Ok(SyncedFile {
            relative_path: relative,
            category: classification.category,
            strategy: classification.strategy,
            local_exists,
            content_differs,
        })
    }

    fn apply(
        &self,
        file: &SyncedFile,
        snapshot: &Path,
        backups: &mut Option<BackupSet>,
        options: &SyncOptions,
    ) -> Result<FileAction> {
        let rel = &file.relative_path;
        let upstream = snapshot.join(rel);
        let local = self.project_root.join(rel);

        match file.strategy {
            Strategy::Skip => {
                let action = if file.category == Some(Category::Exclude) {
                    FileAction::Excluded
                } else {
                    FileAction::Skipped
                };
                if options.verbose {
                    let label = if action == FileAction::Excluded {
                        "Excluded"
                    } else {
                        "Not managed"
                    };
                    println!("  {} {}: {}", "○".yellow(), label, rel.display());
                }
                Ok(action)
            }

            _ if !file.local_exists => {
                if options.dry_run {
                    println!("  {} Would create: {}", "→".cyan(), rel.display());
                } else {
                    copy_file(&upstream, &local)?;
                    println!("  {} Created: {}", "✔".green(), rel.display());
                }
                Ok(FileAction::Created)
            }

            Strategy::CreateIfMissing => {
                if options.verbose {
                    println!("  {} Already present: {}", "✔".green(), rel.display());
                }
                Ok(FileAction::Kept)
            }

            Strategy::Overwrite | Strategy::Merge if file.content_differs != Some(true) => {
                if options.verbose {
                    println!("  {} Up to date: {}", "✔".green(), rel.display());
                }
                Ok(FileAction::Unchanged)
            }

            Strategy::Overwrite => {
                if options.dry_run {
                    println!(
                        "  {} Would backup and replace: {}",
                        "→".cyan(),
                        rel.display()
                    );
                } else {
                    self.backup(backups, rel)?;
                    copy_file(&upstream, &local)?;
                    println!("  {} Updated: {}", "✔".green(), rel.display());
                }
                Ok(FileAction::Updated)
            }

            Strategy::Merge => {
                let merge_rel = merge_file_path(rel);
                let merge_local = self.project_root.join(&merge_rel);

                if merge_local.is_file() && files_identical(&merge_local, &upstream)? {
                    println!(
                        "  {} Merge still pending: {} (see {})",
                        "!".yellow(),
                        rel.display(),
                        merge_rel.display()
                    );
                } else if options.dry_run {
                    println!(
                        "  {} Would write {} for manual merge",
                        "→".cyan(),
                        merge_rel.display()
                    );
                } else {
                    self.backup(backups, rel)?;
                    copy_file(&upstream, &merge_local)?;
                    println!(
                        "  {} Needs merge: {} (upstream version in {})",
                        "!".yellow(),
                        rel.display(),
                        merge_rel.display()
                    );
                }
                Ok(FileAction::MergePending)
            }
        }
    }

    fn backup(&self, backups: &mut Option<BackupSet>, relative: &Path) -> Result<()> {
        if let Some(set) = backups.as_mut() {
            let saved = set.save(&self.project_root, relative)?;
            tracing::debug!(from = %relative.display(), to = %saved.display(), "Backed up");
        }
        Ok(())
    }
}

/// `Makefile` -> `Makefile.template-merge`
pub fn merge_file_path(relative: &Path) -> PathBuf {
    let mut name = OsString::from(relative.as_os_str());
    name.push(MERGE_SUFFIX);
    PathBuf::from(name)
}
