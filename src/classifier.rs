//! Conventional Commits bump classification.
//!
//! Only the subset the release flow relies on is recognised:
//! a breaking marker in the body or a `type!:` / `type(scope)!:` subject is
//! major, a `feat` subject is minor, `fix` and `perf` subjects are patch.
//! Everything else is ignored.

use crate::config::ConventionalCommitsConfig;
use crate::domain::{Commit, Package, SemverBump};
use crate::error::Result;
use crate::git::Repository;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref BREAKING_SUBJECT_RE: Regex =
        Regex::new(r"^[a-zA-Z]+\(.+\)!:|^[a-zA-Z]+!:").unwrap();
}

/// Classifies commit messages into bump levels
pub struct CommitClassifier {
    config: ConventionalCommitsConfig,
}

impl CommitClassifier {
    pub fn new(config: ConventionalCommitsConfig) -> Self {
        CommitClassifier { config }
    }

    /// Bump warranted by a single commit, ignoring which paths it touched
    pub fn commit_bump(&self, subject: &str, body: &str) -> SemverBump {
        if self.is_breaking(subject, body) {
            SemverBump::Major
        } else if starts_with_any(subject, &self.config.minor_types) {
            SemverBump::Minor
        } else if starts_with_any(subject, &self.config.patch_types) {
            SemverBump::Patch
        } else {
            SemverBump::None
        }
    }

    pub fn is_breaking(&self, subject: &str, body: &str) -> bool {
        body.contains(&self.config.breaking_marker) || BREAKING_SUBJECT_RE.is_match(subject)
    }

    /// Reduce the commits touching `package` to one bump level.
    ///
    /// The reduction is monotone: the running level only ever rises, and the
    /// first breaking commit returns `Major` immediately.
    pub fn classify_commits<'c, I>(&self, package: &Package, commits: I) -> SemverBump
    where
        I: IntoIterator<Item = &'c Commit>,
    {
        let mut bump = SemverBump::None;
        for commit in commits {
            if !commit.touches(package) {
                continue;
            }
            let level = self.commit_bump(&commit.subject, &commit.body);
            debug!(
                "{} {} -> {} ({})",
                package.name,
                commit.short_id(),
                level,
                commit.subject
            );
            if level == SemverBump::Major {
                return SemverBump::Major;
            }
            bump = bump.max(level);
        }
        bump
    }

    /// Classify every commit in `(reference, HEAD]` that touched `package`.
    ///
    /// `reference` may be any revision; `None` walks all of HEAD's history.
    pub fn classify<R: Repository>(
        &self,
        repo: &R,
        package: &Package,
        reference: Option<&str>,
    ) -> Result<SemverBump> {
        let commits = repo.commits_since(reference)?;
        Ok(self.classify_commits(package, &commits))
    }
}

fn starts_with_any(subject: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| subject.starts_with(prefix.as_str()))
}
