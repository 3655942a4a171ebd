use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for mono-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Package discovery failed: {0}")]
    Discovery(String),

    #[error("Invalid version format '{value}' in {source_name}: expected MAJOR.MINOR.PATCH")]
    InvalidVersionFormat { value: String, source_name: String },

    #[error("No '{key}' assignment found in {}", .path.display())]
    VersionNotFound { key: String, path: PathBuf },

    #[error("Found {count} '{key}' assignments in {}, expected exactly one", .path.display())]
    AmbiguousVersion {
        key: String,
        path: PathBuf,
        count: usize,
    },

    #[error("Expected to replace exactly 1 '{key}' in {}, would replace {count}", .path.display())]
    VersionFieldNotSingular {
        key: String,
        path: PathBuf,
        count: usize,
    },

    #[error("Version mismatch for {package}: descriptor={descriptor} secondary={secondary} ({})", .secondary_path.display())]
    VersionMismatch {
        package: String,
        descriptor: String,
        secondary: String,
        secondary_path: PathBuf,
    },

    #[error("Tag already exists: {0}")]
    TagExists(String),

    #[error("Command `{command}` failed: {output}")]
    CommandFailed { command: String, output: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Planning failed for {}: {}", .packages.join(", "), .details.join("; "))]
    Planning {
        packages: Vec<String>,
        details: Vec<String>,
    },

    #[error("Publishing failed for {}", .0.join(", "))]
    Publish(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in mono-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a discovery error with context
    pub fn discovery(msg: impl Into<String>) -> Self {
        ReleaseError::Discovery(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    pub fn invalid_version(value: impl Into<String>, source_name: impl Into<String>) -> Self {
        ReleaseError::InvalidVersionFormat {
            value: value.into(),
            source_name: source_name.into(),
        }
    }

    pub fn command_failed(command: impl Into<String>, output: impl Into<String>) -> Self {
        ReleaseError::CommandFailed {
            command: command.into(),
            output: output.into(),
        }
    }
}
