//! Upstream template access
//!
//! The engine never talks to a transport directly. It asks a
//! [`TemplateRepository`] for the latest version identifier and for a
//! snapshot of the configured branch; [`GitRepository`] answers both by
//! shelling out to `git`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::TemplateSource;
use crate::error::{Result, SyncError};

/// Source of upstream template snapshots
///
/// A version identifier names one commit of the configured ref: the highest
/// semver tag pointing at that commit, or the commit id when none does.
pub trait TemplateRepository {
    /// Human-readable locator used in messages
    fn locator(&self) -> String;

    /// Identifier of the commit the configured ref currently points at,
    /// without copying files
    fn latest_version(&self) -> Result<String>;

    /// Materialize a snapshot of the configured ref into `dest` (which exists
    /// and is empty) and return the identifier of the fetched commit.
    fn fetch(&self, dest: &Path) -> Result<String>;
}

/// Template repository reached through the `git` command line
#[derive(Debug, Clone)]
pub struct GitRepository {
    repository: String,
    branch: String,
    /// Directory git runs in; relative local repository paths resolve here
    workdir: PathBuf,
}

impl GitRepository {
    /// Fails with a dependency error when `git` is not installed.
    pub fn new(source: &TemplateSource, workdir: &Path) -> Result<Self> {
        ensure_git()?;
        Ok(Self {
            repository: source.repository.clone(),
            branch: source.branch.clone(),
            workdir: workdir.to_path_buf(),
        })
    }

    fn git(&self, args: &[&str], cwd: &Path) -> Result<String> {
        tracing::debug!(?args, cwd = %cwd.display(), "Running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| SyncError::fetch(&self.repository, format!("could not run git: {}", e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SyncError::fetch(&self.repository, stderr.trim()))
        }
    }

    /// Name a commit by its highest semver tag, falling back to its id.
    fn identify(&self, commit: &str) -> Result<String> {
        let tags = self.git(
            &["ls-remote", "--tags", self.repository.as_str()],
            &self.workdir,
        )?;
        let at_commit = tags_pointing_at(&parse_ls_remote(&tags), commit);
        Ok(select_latest_tag(at_commit).unwrap_or_else(|| commit.to_string()))
    }
}

impl TemplateRepository for GitRepository {
    fn locator(&self) -> String {
        format!("{} ({})", self.repository, self.branch)
    }

    fn latest_version(&self) -> Result<String> {
        let refs = self.git(
            &["ls-remote", self.repository.as_str(), self.branch.as_str()],
            &self.workdir,
        )?;
        let head = ref_commit(&parse_ls_remote(&refs)).ok_or_else(|| {
            SyncError::fetch(
                &self.repository,
                format!("ref `{}` not found upstream", self.branch),
            )
        })?;
        self.identify(&head)
    }

    fn fetch(&self, dest: &Path) -> Result<String> {
        let dest_str = dest.to_string_lossy().into_owned();
        self.git(
            &[
                "clone",
                "--quiet",
                "--depth",
                "1",
                "--single-branch",
                "--branch",
                self.branch.as_str(),
                self.repository.as_str(),
                dest_str.as_str(),
            ],
            &self.workdir,
        )?;
        let head = self.git(&["rev-parse", "HEAD"], dest)?;
        self.identify(head.trim())
    }
}

/// Detect `git` up front so a missing install is an actionable error.
pub fn ensure_git() -> Result<PathBuf> {
    which::which("git").map_err(|_| SyncError::Dependency {
        tool: "git".to_string(),
        hint: "install git from https://git-scm.com/downloads and make sure it is on PATH"
            .to_string(),
    })
}

/// Parse `git ls-remote` output into `(object id, ref name)` pairs.
pub fn parse_ls_remote(output: &str) -> Vec<(String, String)> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let sha = parts.next()?;
            let reference = parts.next()?;
            Some((sha.to_string(), reference.to_string()))
        })
        .collect()
}

/// Commit a ref listing resolves to. For an annotated tag the peeled
/// (`^{}`) entry is the commit; otherwise the first entry is.
pub fn ref_commit(refs: &[(String, String)]) -> Option<String> {
    refs.iter()
        .find(|(_, r)| r.ends_with("^{}"))
        .or_else(|| refs.first())
        .map(|(sha, _)| sha.clone())
}

/// Names of the tags in a `git ls-remote --tags` listing that point at
/// `commit`. Annotated tags match through their peeled entry.
pub fn tags_pointing_at(refs: &[(String, String)], commit: &str) -> Vec<String> {
    let mut names: Vec<String> = refs
        .iter()
        .filter(|(sha, _)| sha == commit)
        .filter_map(|(_, r)| r.strip_prefix("refs/tags/"))
        .map(|name| name.trim_end_matches("^{}").to_string())
        .collect();
    names.dedup();
    names
}

/// Pick the highest semantic-version tag. Tags may carry a `v` prefix;
/// anything that is not semver is ignored.
pub fn select_latest_tag<I>(tags: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    tags.into_iter()
        .filter_map(|tag| {
            let bare = tag.strip_prefix('v').unwrap_or(&tag);
            semver::Version::parse(bare).ok().map(|v| (v, tag))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, tag)| tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_ls_remote() {
        let out = "1111111\trefs/tags/v1.0.0\n2222222\trefs/tags/v1.1.0\n\n";
        let refs = parse_ls_remote(out);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1], ("2222222".to_string(), "refs/tags/v1.1.0".to_string()));
    }

    #[test]
    fn test_select_latest_tag_uses_semver_ordering() {
        let latest = select_latest_tag(tags(&["v1.9.0", "v1.10.0", "v1.2.3"]));
        assert_eq!(latest.as_deref(), Some("v1.10.0"));
    }

    #[test]
    fn test_select_latest_tag_ignores_non_semver() {
        let latest = select_latest_tag(tags(&["nightly", "v0.3.0", "release-2"]));
        assert_eq!(latest.as_deref(), Some("v0.3.0"));
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        let latest = select_latest_tag(tags(&["v2.0.0-rc.1", "v1.4.0", "2.0.0"]));
        assert_eq!(latest.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_no_semver_tags() {
        assert_eq!(select_latest_tag(tags(&["latest"])), None);
        assert_eq!(select_latest_tag(Vec::new()), None);
    }

    fn listing(lines: &[(&str, &str)]) -> Vec<(String, String)> {
        lines
            .iter()
            .map(|(sha, r)| (sha.to_string(), r.to_string()))
            .collect()
    }

    #[test]
    fn test_tags_pointing_at_only_matches_the_commit() {
        let refs = listing(&[
            ("aaa", "refs/tags/v1.0.0"),
            ("bbb", "refs/tags/v1.1.0"),
            ("ccc", "refs/tags/v2.0.0"),
            ("bbb", "refs/tags/latest"),
        ]);
        assert_eq!(tags_pointing_at(&refs, "bbb"), tags(&["v1.1.0", "latest"]));
        assert!(tags_pointing_at(&refs, "ddd").is_empty());
    }

    #[test]
    fn test_annotated_tags_match_through_peeled_entry() {
        let refs = listing(&[
            ("tagobj", "refs/tags/v1.2.0"),
            ("commit1", "refs/tags/v1.2.0^{}"),
        ]);
        assert_eq!(tags_pointing_at(&refs, "commit1"), tags(&["v1.2.0"]));
        assert_eq!(tags_pointing_at(&refs, "tagobj"), tags(&["v1.2.0"]));
    }

    #[test]
    fn test_branch_past_its_tag_has_no_tag_at_head() {
        // v1.0.0 tags an older commit; the branch head is untagged.
        let refs = listing(&[("old", "refs/tags/v1.0.0")]);
        let head = ref_commit(&listing(&[("new", "refs/heads/main")])).unwrap();
        assert_eq!(head, "new");
        assert_eq!(select_latest_tag(tags_pointing_at(&refs, &head)), None);
    }

    #[test]
    fn test_ref_commit_prefers_peeled_entry() {
        let refs = listing(&[
            ("tagobj", "refs/tags/release"),
            ("commit1", "refs/tags/release^{}"),
        ]);
        assert_eq!(ref_commit(&refs).as_deref(), Some("commit1"));
        assert_eq!(ref_commit(&[]), None);
    }
}
