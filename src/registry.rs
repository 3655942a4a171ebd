//! Package discovery.
//!
//! A package is any top-level directory of the repository holding the
//! project descriptor directly (not nested). Packages are rediscovered on
//! every run and returned sorted by name.

use crate::domain::Package;
use crate::error::{ReleaseError, Result};
use std::path::Path;
use tracing::debug;

/// Discover release-eligible packages below `root`.
///
/// # Errors
/// `ReleaseError::Discovery` when the descriptor glob cannot be built or a
/// matching entry cannot be read. An empty result is not an error.
pub fn discover(root: &Path, descriptor: &str) -> Result<Vec<Package>> {
    // `*` must stay a wildcard while the root path itself is matched literally.
    let pattern = format!(
        "{}/*/{}",
        glob::Pattern::escape(&root.to_string_lossy()),
        glob::Pattern::escape(descriptor)
    );
    debug!("Discovering packages with pattern {}", pattern);

    let entries = glob::glob(&pattern)
        .map_err(|e| ReleaseError::discovery(format!("Invalid pattern {}: {}", pattern, e)))?;

    let mut packages = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReleaseError::discovery(e.to_string()))?;
        if !path.is_file() {
            continue;
        }
        let Some(directory) = path.parent() else {
            continue;
        };
        if directory == root {
            continue;
        }
        let Some(name) = directory.file_name() else {
            continue;
        };
        packages.push(Package::new(name.to_string_lossy(), directory));
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Discovered {} packages", packages.len());
    Ok(packages)
}

/// Find a discovered package by name
pub fn find<'p>(packages: &'p [Package], name: &str) -> Option<&'p Package> {
    packages.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_sorted_top_level_packages() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "pyproject.toml", "version = \"9.9.9\"\n");
        write(root, "zeta/pyproject.toml", "version = \"0.1.0\"\n");
        write(root, "alpha/pyproject.toml", "version = \"0.1.0\"\n");
        write(root, "nested/inner/pyproject.toml", "version = \"0.1.0\"\n");
        write(root, "docs/readme.md", "docs\n");

        let packages = discover(root, "pyproject.toml").unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(packages[0].directory, root.join("alpha"));
    }

    #[test]
    fn test_discover_empty_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(discover(temp.path(), "pyproject.toml").unwrap().is_empty());
    }

    #[test]
    fn test_discover_ignores_descriptor_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("weird/pyproject.toml")).unwrap();
        assert!(discover(temp.path(), "pyproject.toml").unwrap().is_empty());
    }

    #[test]
    fn test_find() {
        let packages = vec![Package::new("a", "/r/a"), Package::new("b", "/r/b")];
        assert_eq!(find(&packages, "b").unwrap().name, "b");
        assert!(find(&packages, "c").is_none());
    }
}
