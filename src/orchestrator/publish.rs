//! Publish pass: hosted release records for the latest package tags.

use super::Orchestrator;
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::notice::ReleaseNotice;
use std::path::PathBuf;
use std::process::Command;
use tracing::{error, info};

/// Hosting service that keeps one release record per tag
pub trait ReleaseHost {
    /// Whether a release record exists for `tag`
    fn release_exists(&self, tag: &str) -> Result<bool>;

    /// Create a release record for an existing, pushed tag
    fn create_release(&self, tag: &str, title: &str, notes: &str) -> Result<()>;
}

/// [ReleaseHost] backed by the GitHub CLI (`gh`).
///
/// `gh` reads `GH_TOKEN` from the environment and resolves the hosted
/// repository from the working directory's remotes.
pub struct GhCli {
    workdir: PathBuf,
    program: String,
}

impl GhCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        GhCli {
            workdir: workdir.into(),
            program: "gh".to_string(),
        }
    }

    /// Use a different executable in place of `gh`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        let command = format!("{} {}", self.program, args.join(" "));
        Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| ReleaseError::command_failed(command, e.to_string()))
    }
}

impl ReleaseHost for GhCli {
    fn release_exists(&self, tag: &str) -> Result<bool> {
        let output = self.run(&["release", "view", tag])?;
        if output.status.success() {
            return Ok(true);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_lowercase().contains("not found") {
            return Ok(false);
        }
        Err(ReleaseError::command_failed(
            format!("{} release view {}", self.program, tag),
            format!(
                "exit code {}\nStderr: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        ))
    }

    fn create_release(&self, tag: &str, title: &str, notes: &str) -> Result<()> {
        let output = self.run(&["release", "create", tag, "--title", title, "--notes", notes])?;
        if !output.status.success() {
            return Err(ReleaseError::command_failed(
                format!("{} release create {}", self.program, tag),
                format!(
                    "exit code {}\nStdout: {}\nStderr: {}",
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stdout).trim(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}

/// Outcome of `create-releases`
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Tags that received a new release record
    pub published: Vec<String>,
    pub notices: Vec<ReleaseNotice>,
}

/// Title of a release record, e.g. `"filesystem 0.3.0"`
pub fn release_title(package: &str, version: &str) -> String {
    format!("{} {}", package, version)
}

pub fn release_notes(tag: &str) -> String {
    format!("Automated release for {}", tag)
}

impl<'r, R: Repository> Orchestrator<'r, R> {
    /// The `create-releases` pass.
    ///
    /// A failure for one package does not stop the others.
    ///
    /// # Errors
    /// `ReleaseError::Publish` naming every tag that could not be published,
    /// after all packages were attempted.
    pub fn publish<H: ReleaseHost>(&self, host: &H) -> Result<PublishReport> {
        let mut report = PublishReport::default();
        let mut failed = Vec::new();

        for package in self.packages()? {
            let Some(tag) = self.reference_tag(&package)? else {
                report.notices.push(ReleaseNotice::NoReleaseTag {
                    package: package.name.clone(),
                });
                continue;
            };

            let attempt = package
                .version_from_tag(&self.config.tag_scheme, &tag)
                .and_then(|version| {
                    if host.release_exists(&tag)? {
                        return Ok(false);
                    }
                    let title = release_title(&package.name, &version.to_string());
                    host.create_release(&tag, &title, &release_notes(&tag))?;
                    Ok(true)
                });

            match attempt {
                Ok(true) => {
                    info!("Created release {}", tag);
                    report.published.push(tag);
                }
                Ok(false) => report.notices.push(ReleaseNotice::ReleaseExists { tag }),
                Err(e) => {
                    error!("Failed to publish {}: {}", tag, e);
                    failed.push(tag);
                }
            }
        }

        if !failed.is_empty() {
            return Err(ReleaseError::Publish(failed));
        }
        Ok(report)
    }
}
