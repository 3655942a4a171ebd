//! Version-control query layer
//!
//! This module provides a trait-based abstraction over the git operations the
//! release engine needs, so the detector, classifier and orchestrator can run
//! against a real repository or an in-memory one.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: the real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation that records every mutation
//!
//! Read operations never change the repository. Mutations (stage, commit,
//! tag, push) are only ever issued by the orchestrator.
//!
//! ```rust
//! # use mono_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> mono_release::Result<()> {
//! let latest = repo.latest_tag("better-mcps-filesystem-v")?;
//! let commits = repo.commits_since(latest.as_deref())?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitOp, MockRepository};
pub use repository::Git2Repository;

use crate::domain::tag::select_latest;
use crate::domain::{Commit, TagRef};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Git operations used by the release engine
///
/// All methods are blocking. Implementations map underlying failures to
/// [crate::error::ReleaseError] with enough context to identify the
/// offending revision, tag or remote.
pub trait Repository {
    /// Root of the working tree; package directories live directly below it
    fn workdir(&self) -> &Path;

    /// All tags whose name starts with `prefix`, with their creation times
    fn tags_with_prefix(&self, prefix: &str) -> Result<Vec<TagRef>>;

    /// Whether a tag with exactly this name exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Repository-relative paths of every tracked file
    fn tracked_files(&self) -> Result<Vec<String>>;

    /// Repository-relative paths that differ between two revisions
    ///
    /// `from = None` diffs against the empty tree, so every file present at
    /// `to` is reported.
    fn changed_files(&self, from: Option<&str>, to: &str) -> Result<Vec<String>>;

    /// Commits in `(reference, HEAD]`, most recent first
    ///
    /// With `reference = None` every ancestor of HEAD is returned.
    fn commits_since(&self, reference: Option<&str>) -> Result<Vec<Commit>>;

    /// Add files (absolute or workdir-relative) to the index
    fn stage(&self, paths: &[PathBuf]) -> Result<()>;

    /// Commit the index on top of HEAD, returning the new commit id
    fn commit(&self, message: &str) -> Result<String>;

    /// Push HEAD, attached or detached, to `remote`'s `branch`
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Create an annotated tag on HEAD; fails if the name is taken
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push a single tag to `remote`
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;

    /// Most recent tag starting with `prefix`, if any
    fn latest_tag(&self, prefix: &str) -> Result<Option<String>> {
        let tags = self.tags_with_prefix(prefix)?;
        Ok(select_latest(&tags, prefix).map(|tag| tag.name.clone()))
    }
}

/// Turn `path` into the workdir-relative, `/`-separated form git uses
pub fn to_repo_path(workdir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(workdir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_repo_path() {
        let root = Path::new("/repo");
        assert_eq!(
            to_repo_path(root, Path::new("/repo/fs/pyproject.toml")),
            "fs/pyproject.toml"
        );
        assert_eq!(
            to_repo_path(root, Path::new("fs/src/fs/__init__.py")),
            "fs/src/fs/__init__.py"
        );
    }
}
