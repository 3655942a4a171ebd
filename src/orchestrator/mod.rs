//! Release orchestration
//!
//! The only layer that mutates the repository. Three passes share one
//! [Orchestrator]:
//!
//! - [release]: detect changed packages, plan bumps, apply them as one commit
//!   and tag every planned package (`tag-main`)
//! - [reconcile]: tag packages whose descriptor changed between two revisions
//!   (`tag-on-merge`)
//! - [publish]: create hosted release records for the latest tags
//!   (`create-releases`)
//!
//! Every pass is safe to re-run: existing tags and release records are
//! reported as notices, never re-created.

pub mod publish;
pub mod reconcile;
pub mod release;

pub use publish::{GhCli, PublishReport, ReleaseHost};
pub use reconcile::ReconcileReport;
pub use release::{PlanSet, TagMainReport};

use crate::classifier::CommitClassifier;
use crate::config::Config;
use crate::domain::Package;
use crate::error::Result;
use crate::git::Repository;
use crate::registry;
use crate::version_files::VersionFiles;

/// Release engine bound to one repository and configuration
pub struct Orchestrator<'r, R: Repository> {
    repo: &'r R,
    config: Config,
    classifier: CommitClassifier,
    version_files: VersionFiles,
}

impl<'r, R: Repository> Orchestrator<'r, R> {
    pub fn new(repo: &'r R, config: Config) -> Result<Self> {
        let classifier = CommitClassifier::new(config.conventional_commits.clone());
        let version_files = VersionFiles::new(&config.packages)?;
        Ok(Orchestrator {
            repo,
            config,
            classifier,
            version_files,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Packages currently present in the working tree, sorted by name
    pub fn packages(&self) -> Result<Vec<Package>> {
        registry::discover(self.repo.workdir(), &self.config.packages.descriptor)
    }

    /// Most recent release tag of `package`
    pub fn reference_tag(&self, package: &Package) -> Result<Option<String>> {
        self.repo
            .latest_tag(&package.tag_prefix(&self.config.tag_scheme))
    }

    fn tag_name(&self, package: &Package, version: &crate::domain::Version) -> String {
        package.tag_name(&self.config.tag_scheme, version)
    }
}
