//! End-to-End CLI Tests for template-sync
//!
//! These tests run the binary against a real git repository created in a
//! temporary directory and check outputs, exit codes and file system changes.
//! They are skipped when `git` is not installed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn template_sync_cmd() -> Command {
    Command::cargo_bin("template-sync").unwrap()
}

fn git_available() -> bool {
    which::which("git").is_ok()
}

fn git(cwd: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args([
            "-c",
            "user.name=Template Bot",
            "-c",
            "user.email=bot@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(cwd)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

struct Workspace {
    _temp: TempDir,
    upstream: PathBuf,
    project: PathBuf,
}

impl Workspace {
    /// An upstream template repository on `main` plus an empty project
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let upstream = temp.path().join("go-template");
        let project = temp.path().join("my-service");
        fs::create_dir_all(&upstream).unwrap();
        fs::create_dir_all(&project).unwrap();

        git(&upstream, &["init", "--quiet"]);
        git(&upstream, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        Self {
            _temp: temp,
            upstream,
            project,
        }
    }

    fn upstream_commit(&self, files: &[(&str, &str)], tag: Option<&str>) {
        for (rel, content) in files {
            let path = self.upstream.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        git(&self.upstream, &["add", "-A"]);
        git(&self.upstream, &["commit", "--quiet", "-m", "template update"]);
        if let Some(tag) = tag {
            git(&self.upstream, &["tag", tag]);
        }
    }

    fn write_config(&self, lists: &str) {
        let config = format!(
            "template:\n  repository: {}\n  branch: main\n{}",
            self.upstream.display(),
            lists
        );
        fs::write(self.project.join(".template-sync.yml"), config).unwrap();
    }

    fn local_file(&self, rel: &str, content: &str) {
        let path = self.project.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read_local(&self, rel: &str) -> String {
        fs::read_to_string(self.project.join(rel)).unwrap()
    }

    fn cmd(&self) -> Command {
        let mut cmd = template_sync_cmd();
        cmd.current_dir(&self.project);
        cmd
    }
}

// =============================================================================
// GENERAL CLI TESTS
// =============================================================================

#[test]
fn test_cli_help_lists_flags() {
    template_sync_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--force"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--check"));
}

#[test]
fn test_cli_missing_config_is_config_error() {
    let temp_dir = TempDir::new().unwrap();

    template_sync_cmd()
        .arg("--config")
        .arg(temp_dir.path().join("nope.yml"))
        .arg("--force")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn test_cli_malformed_config_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".template-sync.yml"),
        "template: [oops\n",
    )
    .unwrap();

    template_sync_cmd()
        .current_dir(temp_dir.path())
        .arg("--force")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("✘ error:"));
}

#[test]
fn test_cli_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();

    template_sync_cmd()
        .arg("--init")
        .arg("--path")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete"));

    let content = fs::read_to_string(temp_dir.path().join(".template-sync.yml")).unwrap();
    assert!(content.contains("create_if_missing:"));
}

#[test]
fn test_cli_init_without_force_keeps_existing() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join(".template-sync.yml");
    fs::write(&config_path, "# mine").unwrap();

    template_sync_cmd()
        .arg("--init")
        .arg("--path")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine");
}

#[test]
fn test_cli_missing_git_is_dependency_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".template-sync.yml"),
        "template:\n  repository: https://example.com/go-template.git\n",
    )
    .unwrap();

    template_sync_cmd()
        .current_dir(temp_dir.path())
        .env("PATH", "")
        .arg("--force")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("git is required"));

    assert!(!temp_dir.path().join(".template-version").exists());
}

// =============================================================================
// SYNC TESTS
// =============================================================================

#[test]
fn test_cli_force_sync_applies_strategies() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(
        &[
            (".gitignore", "# Updated"),
            ("Makefile", "build:\n\nlint:\n"),
            ("docs/new.md", "# New"),
            ("internal/domain/entities/user.go", "package entities"),
        ],
        Some("v1.0.0"),
    );
    ws.write_config(
        "overwrite: [.gitignore]\nmerge: [Makefile]\ncreate_if_missing: [docs/]\nexclude: [\"internal/domain/**\"]\n",
    );
    ws.local_file(".gitignore", "custom");
    ws.local_file("Makefile", "build:\n\ncustom:\n");

    ws.cmd()
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync complete"))
        .stdout(predicate::str::contains("Needs merge"));

    assert_eq!(ws.read_local(".gitignore"), "# Updated");
    assert_eq!(ws.read_local("Makefile"), "build:\n\ncustom:\n");
    assert_eq!(ws.read_local("Makefile.template-merge"), "build:\n\nlint:\n");
    assert_eq!(ws.read_local("docs/new.md"), "# New");
    assert!(!ws.project.join("internal/domain/entities/user.go").exists());
    assert_eq!(ws.read_local(".template-version").trim(), "v1.0.0");
    assert!(!ws.project.join(".git").exists());
}

#[test]
fn test_cli_without_force_and_no_terminal_declines() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[(".gitignore", "# Updated")], Some("v1.0.0"));
    ws.write_config("overwrite: [.gitignore]\n");
    ws.local_file(".gitignore", "custom");

    ws.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("cancelled"));

    assert_eq!(ws.read_local(".gitignore"), "custom");
    assert!(!ws.project.join(".template-version").exists());
}

#[test]
fn test_cli_dry_run_changes_nothing() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[(".gitignore", "# Updated")], Some("v1.0.0"));
    ws.write_config("overwrite: [.gitignore]\nhooks:\n  post_sync: [\"touch hooked.txt\"]\n");
    ws.local_file(".gitignore", "custom");

    ws.cmd()
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would backup and replace"))
        .stdout(predicate::str::contains("Would run post-sync hook"));

    assert_eq!(ws.read_local(".gitignore"), "custom");
    assert!(!ws.project.join(".template-version").exists());
    assert!(!ws.project.join(".template-backups").exists());
    assert!(!ws.project.join("hooked.txt").exists());
}

#[test]
#[cfg(unix)]
fn test_cli_runs_hooks_and_survives_failures() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[(".gitignore", "# Updated")], Some("v1.0.0"));
    ws.write_config(
        "overwrite: [.gitignore]\nhooks:\n  pre_sync: [\"exit 1\"]\n  post_sync: [\"echo done > hooked.txt\"]\n",
    );

    ws.cmd()
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("hook(s) failed"));

    assert_eq!(ws.read_local(".gitignore"), "# Updated");
    assert_eq!(ws.read_local("hooked.txt").trim(), "done");
}

#[test]
fn test_cli_unreachable_template_is_fetch_error() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    let config = format!(
        "template:\n  repository: {}\noverwrite: [.gitignore]\n",
        ws.project.join("does-not-exist").display()
    );
    fs::write(ws.project.join(".template-sync.yml"), config).unwrap();
    ws.local_file(".gitignore", "custom");

    ws.cmd()
        .arg("--force")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("failed to fetch template"));

    assert_eq!(ws.read_local(".gitignore"), "custom");
    assert!(!ws.project.join(".template-backups").exists());
}

// =============================================================================
// CHECK MODE TESTS
// =============================================================================

#[test]
fn test_cli_check_up_to_date() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[("Makefile", "build:")], Some("v1.0.0"));
    ws.write_config("");
    ws.local_file(".template-version", "v1.0.0\n");

    ws.cmd()
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_cli_check_updates_available_fails() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[("Makefile", "build:")], Some("v1.0.0"));
    ws.upstream_commit(&[("Makefile", "build:\nlint:")], Some("v1.1.0"));
    ws.write_config("");
    ws.local_file(".template-version", "v1.0.0\n");

    ws.cmd()
        .arg("--check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("updates available"))
        .stdout(predicate::str::contains("v1.1.0"));

    assert_eq!(ws.read_local(".template-version"), "v1.0.0\n");
}

#[test]
fn test_cli_check_json_output() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[("Makefile", "build:")], Some("v2.0.0"));
    ws.write_config("");

    let output = ws.cmd().arg("--check").arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["latest"], "v2.0.0");
    assert_eq!(status["current"], serde_json::Value::Null);
    assert_eq!(status["updates_available"], true);
}

#[test]
fn test_cli_untagged_template_tracks_commit() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[("Makefile", "build:")], None);
    let head = git(&ws.upstream, &["rev-parse", "HEAD"]);
    ws.write_config("overwrite: [Makefile]\n");

    ws.cmd().arg("--force").assert().success();
    assert_eq!(ws.read_local(".template-version").trim(), head);

    ws.cmd()
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));
}

#[test]
fn test_cli_branch_past_its_tag_records_head_commit() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[("Makefile", "build:")], Some("v1.0.0"));
    ws.upstream_commit(&[("Makefile", "build:\ntest:")], None);
    let head = git(&ws.upstream, &["rev-parse", "HEAD"]);
    ws.write_config("overwrite: [Makefile]\n");

    ws.cmd().arg("--force").assert().success();
    assert_eq!(ws.read_local("Makefile"), "build:\ntest:");
    let marker = ws.read_local(".template-version");
    assert_ne!(marker.trim(), "v1.0.0");
    assert_eq!(marker.trim(), head);

    ws.cmd()
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));

    ws.upstream_commit(&[("Makefile", "build:\ntest:\nlint:")], None);
    ws.cmd()
        .arg("--check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("updates available"));
}

#[test]
fn test_cli_branch_override_ignores_tags_on_other_branches() {
    if !git_available() {
        return;
    }
    let ws = Workspace::new();
    ws.upstream_commit(&[("Makefile", "build:")], Some("v2.0.0"));
    git(&ws.upstream, &["checkout", "--quiet", "-b", "develop"]);
    ws.upstream_commit(&[("Makefile", "build:\nexperimental:")], None);
    let develop_head = git(&ws.upstream, &["rev-parse", "HEAD"]);
    ws.write_config("overwrite: [Makefile]\n");

    ws.cmd()
        .args(["--branch", "develop", "--force"])
        .assert()
        .success();
    assert_eq!(ws.read_local("Makefile"), "build:\nexperimental:");
    assert_eq!(ws.read_local(".template-version").trim(), develop_head);

    ws.cmd()
        .args(["--branch", "develop", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Up to date"));
}
