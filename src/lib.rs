//! template-sync - keep a project in step with its template repository
//!
//! Projects scaffolded from a template drift from it over time. This crate
//! pulls a fresh snapshot of the template and applies it file by file
//! according to declarative rules: some files are overwritten, some produce a
//! side-by-side copy for manual merging, some are only created when missing,
//! and some are never touched.

pub mod backup;
pub mod config;
pub mod error;
pub mod fs;
pub mod hooks;
pub mod init;
pub mod patterns;
pub mod prompt;
pub mod source;
pub mod syncer;
pub mod version;

pub use config::SyncConfig;
pub use error::SyncError;
pub use source::{GitRepository, TemplateRepository};
pub use syncer::{SyncOptions, SyncOutcome, SyncReport, Syncer};
pub use version::UpdateStatus;
