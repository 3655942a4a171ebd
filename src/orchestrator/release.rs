//! Plan-and-tag pass.
//!
//! Planning reads everything and mutates nothing; any per-package failure
//! aborts the run before the first file is written. Application writes the
//! version files, makes one combined commit, pushes it and only then creates
//! and pushes one annotated tag per package.

use super::Orchestrator;
use crate::detector::has_changed;
use crate::domain::plan::{release_commit_message, tag_message};
use crate::domain::{Package, ReleasePlan, SemverBump};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::notice::ReleaseNotice;
use crate::registry;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Plans computed for one run, plus what was skipped along the way
#[derive(Debug, Clone, Default)]
pub struct PlanSet {
    pub plans: Vec<ReleasePlan>,
    pub notices: Vec<ReleaseNotice>,
}

enum Decision {
    Unchanged {
        reference_tag: Option<String>,
    },
    Release {
        plan: ReleasePlan,
        forced: bool,
    },
}

/// Outcome of `tag-main`
#[derive(Debug, Clone, Default)]
pub struct TagMainReport {
    pub plans: Vec<ReleasePlan>,
    /// Id of the combined release commit; `None` for dry runs and no-ops
    pub commit: Option<String>,
    /// Tags created and pushed, in plan order
    pub tags: Vec<String>,
    pub notices: Vec<ReleaseNotice>,
    pub dry_run: bool,
}

impl<'r, R: Repository> Orchestrator<'r, R> {
    /// Packages with any change since their last release tag
    pub fn changed_packages(&self) -> Result<Vec<Package>> {
        let mut changed = Vec::new();
        for package in self.packages()? {
            let reference = self.reference_tag(&package)?;
            if has_changed(self.repo, &package, reference.as_deref())? {
                changed.push(package);
            }
        }
        Ok(changed)
    }

    /// Overall bump of `package_name` since an arbitrary revision.
    ///
    /// An empty or `"none"` (any case) revision means the whole history of HEAD.
    pub fn bump_level(&self, package_name: &str, since: Option<&str>) -> Result<SemverBump> {
        let packages = self.packages()?;
        let package = registry::find(&packages, package_name).ok_or_else(|| {
            ReleaseError::discovery(format!("Unknown package: {}", package_name))
        })?;
        let since = since.filter(|rev| !rev.is_empty() && !rev.eq_ignore_ascii_case("none"));
        self.classifier.classify(self.repo, package, since)
    }

    /// Plan a release for one package; `None` when it has not changed.
    ///
    /// Everything that would make application fail is checked here: the
    /// version files must be readable, consistent and rewritable, and the
    /// target tag must not exist yet.
    pub fn plan_package(&self, package: &Package) -> Result<Option<ReleasePlan>> {
        Ok(match self.decide(package)? {
            Decision::Release { plan, .. } => Some(plan),
            Decision::Unchanged { .. } => None,
        })
    }

    fn decide(&self, package: &Package) -> Result<Decision> {
        let reference_tag = self.reference_tag(package)?;
        if !has_changed(self.repo, package, reference_tag.as_deref())? {
            return Ok(Decision::Unchanged { reference_tag });
        }

        let classified = self
            .classifier
            .classify(self.repo, package, reference_tag.as_deref())?;
        // A package with real diffs is always released.
        let bump = match classified {
            SemverBump::None => SemverBump::Patch,
            level => level,
        };

        let current_version = self.version_files.verify_consistent(package)?;
        self.version_files.check_writable(package)?;
        let descriptor = self.version_files.descriptor_path(package);
        let next_version = current_version.bump(bump, &descriptor.display().to_string())?;

        let tag = self.tag_name(package, &next_version);
        if self.repo.tag_exists(&tag)? {
            return Err(ReleaseError::TagExists(tag));
        }

        debug!(
            "Planned {} {} -> {} ({}, classified {})",
            package.name, current_version, next_version, bump, classified
        );
        Ok(Decision::Release {
            plan: ReleasePlan {
                package: package.clone(),
                reference_tag,
                current_version,
                next_version,
                bump,
            },
            forced: classified == SemverBump::None,
        })
    }

    /// Plan every changed package.
    ///
    /// # Errors
    /// `ReleaseError::Planning` listing every package that failed, after all
    /// packages were examined. Discovery failures abort immediately.
    pub fn plan_release(&self) -> Result<PlanSet> {
        let mut set = PlanSet::default();
        let mut failed = Vec::new();
        let mut details = Vec::new();

        for package in self.packages()? {
            match self.decide(&package) {
                Ok(Decision::Release { plan, forced }) => {
                    if forced {
                        set.notices.push(ReleaseNotice::ForcedPatch {
                            package: package.name.clone(),
                        });
                    }
                    set.plans.push(plan);
                }
                Ok(Decision::Unchanged { reference_tag }) => {
                    set.notices.push(ReleaseNotice::PackageUnchanged {
                        package: package.name.clone(),
                        reference_tag,
                    })
                }
                Err(e) => {
                    warn!("Cannot plan {}: {}", package.name, e);
                    details.push(format!("{}: {}", package.name, e));
                    failed.push(package.name);
                }
            }
        }

        if !failed.is_empty() {
            return Err(ReleaseError::Planning {
                packages: failed,
                details,
            });
        }
        Ok(set)
    }

    /// Apply pre-validated plans, returning the commit id and created tags.
    ///
    /// There is no rollback: a failure part way leaves the commit pushed and
    /// earlier tags in place for manual recovery.
    pub fn apply(&self, plans: &[ReleasePlan]) -> Result<(String, Vec<String>)> {
        let mut written: Vec<PathBuf> = Vec::new();
        for plan in plans {
            written.extend(
                self.version_files
                    .write_version(&plan.package, &plan.next_version)?,
            );
        }
        self.repo.stage(&written)?;

        let commit = self.repo.commit(&release_commit_message(plans))?;
        self.repo
            .push_branch(&self.config.remote, &self.config.branch)?;

        let mut tags = Vec::new();
        for plan in plans {
            let tag = plan.tag_name(&self.config.tag_scheme);
            self.repo.create_annotated_tag(&tag, &tag_message(&tag))?;
            self.repo.push_tag(&self.config.remote, &tag)?;
            info!("Released {} {}", plan.package.name, plan.next_version);
            tags.push(tag);
        }
        Ok((commit, tags))
    }

    /// The `tag-main` pass: plan everything, then apply unless `dry_run`
    pub fn tag_main(&self, dry_run: bool) -> Result<TagMainReport> {
        let PlanSet { plans, mut notices } = self.plan_release()?;

        if plans.is_empty() {
            notices.push(ReleaseNotice::NothingToRelease);
            return Ok(TagMainReport {
                notices,
                dry_run,
                ..TagMainReport::default()
            });
        }

        if dry_run {
            return Ok(TagMainReport {
                plans,
                notices,
                dry_run,
                ..TagMainReport::default()
            });
        }

        let (commit, tags) = self.apply(&plans)?;
        Ok(TagMainReport {
            plans,
            commit: Some(commit),
            tags,
            notices,
            dry_run,
        })
    }
}
