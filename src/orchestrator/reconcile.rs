//! Reconcile-on-merge pass.
//!
//! Runs after a push to the mainline: every package whose descriptor changed
//! between `before` and `after` gets a tag for the version it now declares.
//! All packages are validated before the first tag is created.

use super::Orchestrator;
use crate::domain::plan::tag_message;
use crate::domain::{Package, Version};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::notice::ReleaseNotice;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Outcome of `tag-on-merge`
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Tags created (or, for dry runs, that would be created)
    pub tags: Vec<String>,
    pub notices: Vec<ReleaseNotice>,
    pub dry_run: bool,
}

/// Whether `rev` is the all-zero id CI passes for a branch's first push
pub fn is_null_revision(rev: &str) -> bool {
    !rev.is_empty() && rev.chars().all(|c| c == '0')
}

impl<'r, R: Repository> Orchestrator<'r, R> {
    /// Packages whose project descriptor differs between two revisions
    pub fn packages_with_changed_descriptor(
        &self,
        before: &str,
        after: &str,
    ) -> Result<Vec<Package>> {
        if before == after {
            return Ok(Vec::new());
        }
        let from = if is_null_revision(before) {
            None
        } else {
            Some(before)
        };
        let changed = self.repo.changed_files(from, after)?;

        let pattern = format!(
            "^([^/]+)/{}$",
            regex::escape(&self.config.packages.descriptor)
        );
        let descriptor_re = Regex::new(&pattern)
            .map_err(|e| ReleaseError::config(format!("Invalid descriptor name: {}", e)))?;

        let names: BTreeSet<&str> = changed
            .iter()
            .filter_map(|path| descriptor_re.captures(path))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        // A deleted package has nothing left to tag.
        let workdir = self.repo.workdir();
        Ok(names
            .into_iter()
            .map(|name| Package::new(name, workdir.join(name)))
            .filter(|package| {
                package
                    .descriptor_path(&self.config.packages.descriptor)
                    .is_file()
            })
            .collect())
    }

    /// The `tag-on-merge` pass.
    ///
    /// # Errors
    /// Any package whose version cannot be read, or whose secondary version
    /// file disagrees with the descriptor, fails the run before any tag is
    /// created. An existing tag is a notice, not an error.
    pub fn reconcile(&self, before: &str, after: &str, dry_run: bool) -> Result<ReconcileReport> {
        let packages = self.packages_with_changed_descriptor(before, after)?;
        debug!(
            "Descriptor changes in {}..{}: {:?}",
            before,
            after,
            packages.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );

        let mut validated: Vec<(Package, Version)> = Vec::new();
        for package in packages {
            let version = self.version_files.verify_consistent(&package)?;
            validated.push((package, version));
        }

        let mut report = ReconcileReport {
            dry_run,
            ..ReconcileReport::default()
        };
        for (package, version) in validated {
            let tag = self.tag_name(&package, &version);
            if self.repo.tag_exists(&tag)? {
                report.notices.push(ReleaseNotice::TagAlreadyExists {
                    package: package.name.clone(),
                    tag,
                });
                continue;
            }
            if !dry_run {
                self.repo.create_annotated_tag(&tag, &tag_message(&tag))?;
                self.repo.push_tag(&self.config.remote, &tag)?;
                info!("Tagged {} {}", package.name, version);
            }
            report.tags.push(tag);
        }
        Ok(report)
    }
}
