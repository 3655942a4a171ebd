//! Reading and rewriting version metadata on disk.
//!
//! Every package has one authoritative `version = "X.Y.Z"` line in its
//! project descriptor and, optionally, a `__version__ = "X.Y.Z"` copy in a
//! source init file. Rewrites are single-occurrence substitutions: the match
//! count is computed first and anything other than exactly one is an error,
//! so a stray second assignment can never be silently edited.

use crate::config::PackagesConfig;
use crate::domain::{Package, Version};
use crate::error::{ReleaseError, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A single-line `key = "value"` assignment
#[derive(Debug, Clone)]
pub struct VersionField {
    key: String,
    regex: Regex,
}

impl VersionField {
    pub fn new(key: &str) -> Result<Self> {
        let pattern = format!(
            r#"(?m)^({}[ \t]*=[ \t]*)"([^"\n]+)"([ \t]*\r?)$"#,
            regex::escape(key)
        );
        let regex = Regex::new(&pattern)
            .map_err(|e| ReleaseError::config(format!("Invalid version key '{}': {}", key, e)))?;
        Ok(VersionField {
            key: key.to_string(),
            regex,
        })
    }

    /// Raw values of every matching assignment, in file order
    pub fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(2).map(|m| m.as_str()))
            .collect()
    }

    /// Replace every matching assignment's value, returning the new text and
    /// the number of replacements. Surrounding spacing is preserved.
    pub fn substitute(&self, text: &str, version: &Version) -> (String, usize) {
        let count = self.regex.find_iter(text).count();
        let replaced = self.regex.replace_all(text, |caps: &Captures<'_>| {
            format!("{}\"{}\"{}", &caps[1], version, &caps[3])
        });
        (replaced.into_owned(), count)
    }

    /// Read the single assignment in `path`
    pub fn read(&self, path: &Path) -> Result<Version> {
        let text = fs::read_to_string(path)?;
        let values = self.find_all(&text);
        match values.as_slice() {
            [] => Err(ReleaseError::VersionNotFound {
                key: self.key.clone(),
                path: path.to_path_buf(),
            }),
            [value] => Version::parse_from(value, &path.display().to_string()),
            _ => Err(ReleaseError::AmbiguousVersion {
                key: self.key.clone(),
                path: path.to_path_buf(),
                count: values.len(),
            }),
        }
    }

    /// Fail unless `path` holds exactly one assignment to rewrite
    pub fn check_singular(&self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)?;
        let count = self.regex.find_iter(&text).count();
        if count != 1 {
            return Err(self.not_singular(path, count));
        }
        Ok(())
    }

    /// Rewrite the single assignment in `path` to `version`
    pub fn write(&self, path: &Path, version: &Version) -> Result<()> {
        let text = fs::read_to_string(path)?;
        let (new_text, count) = self.substitute(&text, version);
        if count != 1 {
            return Err(self.not_singular(path, count));
        }
        fs::write(path, new_text)?;
        info!("Set {} = \"{}\" in {}", self.key, version, path.display());
        Ok(())
    }

    fn not_singular(&self, path: &Path, count: usize) -> ReleaseError {
        ReleaseError::VersionFieldNotSingular {
            key: self.key.clone(),
            path: path.to_path_buf(),
            count,
        }
    }
}

/// Version file synchronizer for one repository layout
#[derive(Debug, Clone)]
pub struct VersionFiles {
    config: PackagesConfig,
    descriptor_field: VersionField,
    constant_field: VersionField,
}

impl VersionFiles {
    pub fn new(config: &PackagesConfig) -> Result<Self> {
        Ok(VersionFiles {
            config: config.clone(),
            descriptor_field: VersionField::new(&config.version_key)?,
            constant_field: VersionField::new(&config.version_constant)?,
        })
    }

    pub fn descriptor_path(&self, package: &Package) -> PathBuf {
        package.descriptor_path(&self.config.descriptor)
    }

    /// Version declared in the package's project descriptor
    pub fn read_version(&self, package: &Package) -> Result<Version> {
        self.descriptor_field.read(&self.descriptor_path(package))
    }

    /// Version declared in a secondary version file
    pub fn read_secondary_version(&self, path: &Path) -> Result<Version> {
        self.constant_field.read(path)
    }

    /// Locate the secondary version file, if the package has one.
    ///
    /// Candidates are `<package>/<source_dir>/*/<init_file>` files that
    /// mention the version constant. More than one candidate is ambiguous.
    pub fn find_secondary_version_file(&self, package: &Package) -> Result<Option<PathBuf>> {
        let source_dir = package.directory.join(&self.config.source_dir);
        if !source_dir.is_dir() {
            return Ok(None);
        }

        let pattern = format!(
            "{}/*/{}",
            glob::Pattern::escape(&source_dir.to_string_lossy()),
            glob::Pattern::escape(&self.config.init_file)
        );
        let entries = glob::glob(&pattern)
            .map_err(|e| ReleaseError::discovery(format!("Invalid pattern {}: {}", pattern, e)))?;

        let mut candidates = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ReleaseError::discovery(e.to_string()))?;
            if !path.is_file() {
                continue;
            }
            if fs::read_to_string(&path)?.contains(&self.config.version_constant) {
                candidates.push(path);
            }
        }

        match candidates.len() {
            0 => Ok(None),
            1 => {
                let path = candidates.remove(0);
                debug!("Secondary version file for {}: {}", package.name, path.display());
                Ok(Some(path))
            }
            count => Err(ReleaseError::AmbiguousVersion {
                key: self.config.version_constant.clone(),
                path: source_dir,
                count,
            }),
        }
    }

    /// Descriptor version, after checking the secondary copy agrees with it
    pub fn verify_consistent(&self, package: &Package) -> Result<Version> {
        let version = self.read_version(package)?;
        if let Some(path) = self.find_secondary_version_file(package)? {
            let secondary = self.read_secondary_version(&path)?;
            if secondary != version {
                return Err(ReleaseError::VersionMismatch {
                    package: package.name.clone(),
                    descriptor: version.to_string(),
                    secondary: secondary.to_string(),
                    secondary_path: path,
                });
            }
        }
        Ok(version)
    }

    /// Fail unless every version file of `package` can be rewritten
    pub fn check_writable(&self, package: &Package) -> Result<()> {
        self.descriptor_field
            .check_singular(&self.descriptor_path(package))?;
        if let Some(path) = self.find_secondary_version_file(package)? {
            self.constant_field.check_singular(&path)?;
        }
        Ok(())
    }

    /// Rewrite the descriptor and, if present, the secondary file.
    ///
    /// Both files are checked before either is written. Returns the paths
    /// that were modified.
    pub fn write_version(&self, package: &Package, version: &Version) -> Result<Vec<PathBuf>> {
        self.check_writable(package)?;

        let descriptor = self.descriptor_path(package);
        self.descriptor_field.write(&descriptor, version)?;
        let mut written = vec![descriptor];

        if let Some(path) = self.find_secondary_version_file(package)? {
            self.constant_field.write(&path, version)?;
            written.push(path);
        }
        Ok(written)
    }
}
