use crate::domain::Version;
use crate::error::{ReleaseError, Result};
use std::path::PathBuf;

/// A release-eligible directory at the top level of the repository.
///
/// The name is the directory's base name and doubles as the path prefix
/// (`<name>/`) that commits and diffs are matched against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Package {
    pub name: String,
    pub directory: PathBuf,
}

impl Package {
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Package {
            name: name.into(),
            directory: directory.into(),
        }
    }

    /// Repository-relative path prefix, e.g. `"filesystem/"`
    pub fn path_prefix(&self) -> String {
        format!("{}/", self.name)
    }

    /// Whether a repository-relative path lives under this package
    pub fn owns_path(&self, path: &str) -> bool {
        path.starts_with(&self.path_prefix())
    }

    /// Tag prefix for this package, e.g. `"better-mcps-filesystem-v"`
    pub fn tag_prefix(&self, scheme: &str) -> String {
        format!("{}-{}-v", scheme, self.name)
    }

    /// Full tag name for a released version
    pub fn tag_name(&self, scheme: &str, version: &Version) -> String {
        format!("{}{}", self.tag_prefix(scheme), version)
    }

    /// Extract the version suffix from one of this package's tags.
    ///
    /// The suffix is returned verbatim; use [`Package::version_from_tag`]
    /// to also validate it.
    pub fn version_suffix<'t>(&self, scheme: &str, tag: &'t str) -> Result<&'t str> {
        let prefix = self.tag_prefix(scheme);
        tag.strip_prefix(prefix.as_str()).ok_or_else(|| {
            ReleaseError::config(format!("Tag {} does not match {}", tag, prefix))
        })
    }

    pub fn version_from_tag(&self, scheme: &str, tag: &str) -> Result<Version> {
        let suffix = self.version_suffix(scheme, tag)?;
        Version::parse_from(suffix, &format!("tag {}", tag))
    }

    /// Path of the project descriptor inside the package directory
    pub fn descriptor_path(&self, descriptor: &str) -> PathBuf {
        self.directory.join(descriptor)
    }
}
