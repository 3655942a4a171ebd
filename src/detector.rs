use crate::domain::Package;
use crate::error::Result;
use crate::git::Repository;
use tracing::debug;

/// Whether `package` has anything to release since `reference_tag`.
///
/// Without a reference tag (first release) a package is eligible as soon as
/// it tracks at least one file. Otherwise any path under the package
/// directory that differs between the tag and HEAD counts.
pub fn has_changed<R: Repository>(
    repo: &R,
    package: &Package,
    reference_tag: Option<&str>,
) -> Result<bool> {
    let files = match reference_tag {
        None => repo.tracked_files()?,
        Some(tag) => repo.changed_files(Some(tag), "HEAD")?,
    };
    let changed = files.iter().any(|path| package.owns_path(path));
    debug!(
        "Package {} changed since {}: {}",
        package.name,
        reference_tag.unwrap_or("<first release>"),
        changed
    );
    Ok(changed)
}
