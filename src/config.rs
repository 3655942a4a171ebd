use crate::error::{ReleaseError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up at the repository root
pub const CONFIG_FILE_NAME: &str = "mono-release.toml";

/// Represents the complete configuration for mono-release.
///
/// Contains the tag scheme, the remote/branch the release commit is pushed to,
/// the package file layout, and the conventional commit rules.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_tag_scheme")]
    pub tag_scheme: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default)]
    pub packages: PackagesConfig,

    #[serde(default)]
    pub conventional_commits: ConventionalCommitsConfig,
}

fn default_tag_scheme() -> String {
    "release".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_scheme: default_tag_scheme(),
            remote: default_remote(),
            branch: default_branch(),
            packages: PackagesConfig::default(),
            conventional_commits: ConventionalCommitsConfig::default(),
        }
    }
}

/// Where package version metadata lives.
///
/// A package is a top-level directory holding `descriptor`, whose
/// `version_key = "X.Y.Z"` line is the authoritative version. An optional
/// secondary copy is a `version_constant = "X.Y.Z"` line inside
/// `<package>/<source_dir>/*/<init_file>`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PackagesConfig {
    #[serde(default = "default_descriptor")]
    pub descriptor: String,

    #[serde(default = "default_version_key")]
    pub version_key: String,

    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    #[serde(default = "default_init_file")]
    pub init_file: String,

    #[serde(default = "default_version_constant")]
    pub version_constant: String,
}

fn default_descriptor() -> String {
    "pyproject.toml".to_string()
}

fn default_version_key() -> String {
    "version".to_string()
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_init_file() -> String {
    "__init__.py".to_string()
}

fn default_version_constant() -> String {
    "__version__".to_string()
}

impl Default for PackagesConfig {
    fn default() -> Self {
        PackagesConfig {
            descriptor: default_descriptor(),
            version_key: default_version_key(),
            source_dir: default_source_dir(),
            init_file: default_init_file(),
            version_constant: default_version_constant(),
        }
    }
}

/// Returns the default breaking change marker searched for in commit bodies.
fn default_breaking_marker() -> String {
    "BREAKING CHANGE".to_string()
}

/// Returns the default subject prefixes that trigger minor bumps.
fn default_minor_types() -> Vec<String> {
    vec!["feat".to_string()]
}

/// Returns the default subject prefixes that trigger patch bumps.
fn default_patch_types() -> Vec<String> {
    vec!["fix".to_string(), "perf".to_string()]
}

/// Configuration for conventional commit classification.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ConventionalCommitsConfig {
    #[serde(default = "default_breaking_marker")]
    pub breaking_marker: String,

    #[serde(default = "default_minor_types")]
    pub minor_types: Vec<String>,

    #[serde(default = "default_patch_types")]
    pub patch_types: Vec<String>,
}

impl Default for ConventionalCommitsConfig {
    fn default() -> Self {
        ConventionalCommitsConfig {
            breaking_marker: default_breaking_marker(),
            minor_types: default_minor_types(),
            patch_types: default_patch_types(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| ReleaseError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.tag_scheme.trim().is_empty() {
            return Err(ReleaseError::config("tag_scheme must not be empty"));
        }
        if self.packages.descriptor.contains('/') {
            return Err(ReleaseError::config(format!(
                "descriptor must be a bare file name, got '{}'",
                self.packages.descriptor
            )));
        }
        if self.packages.version_key.is_empty() || self.packages.version_constant.is_empty() {
            return Err(ReleaseError::config("version keys must not be empty"));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `mono-release.toml` at the repository root
/// 3. `<config dir>/mono-release/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Errors
/// Returns `ReleaseError::Config` if a file exists but cannot be parsed,
/// and `ReleaseError::Io` if it cannot be read.
pub fn load_config(config_path: Option<&Path>, repo_root: &Path) -> Result<Config> {
    match locate_config(config_path, repo_root) {
        Some(path) => {
            tracing::debug!("Loading configuration from: {}", path.display());
            let text = fs::read_to_string(&path)?;
            Config::from_toml(&text)
        }
        None => {
            tracing::debug!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn locate_config(config_path: Option<&Path>, repo_root: &Path) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let local = repo_root.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("mono-release").join("config.toml"))
        .filter(|path| path.exists())
}
