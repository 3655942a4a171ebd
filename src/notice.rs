use std::fmt;

/// Non-fatal conditions met while releasing.
/// These are reported to the user but never fail a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseNotice {
    /// No file under the package changed since its last tag
    PackageUnchanged {
        package: String,
        reference_tag: Option<String>,
    },
    /// Changed files but no Conventional Commit; released as a patch
    ForcedPatch { package: String },
    /// Nothing changed anywhere; no commit or tag was made
    NothingToRelease,
    /// The tag for this version is already present
    TagAlreadyExists { package: String, tag: String },
    /// The package has no release tag to publish
    NoReleaseTag { package: String },
    /// A hosted release record already exists for this tag
    ReleaseExists { tag: String },
}

impl fmt::Display for ReleaseNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseNotice::PackageUnchanged {
                package,
                reference_tag,
            } => match reference_tag {
                Some(tag) => write!(f, "{} unchanged since {}", package, tag),
                None => write!(f, "{} has no tracked files", package),
            },
            ReleaseNotice::ForcedPatch { package } => write!(
                f,
                "{} changed without conventional commits, releasing as patch",
                package
            ),
            ReleaseNotice::NothingToRelease => {
                write!(f, "No packages changed; nothing to tag")
            }
            ReleaseNotice::TagAlreadyExists { package, tag } => {
                write!(f, "Tag {} already exists for {}, skipping", tag, package)
            }
            ReleaseNotice::NoReleaseTag { package } => {
                write!(f, "{} has no release tag, skipping", package)
            }
            ReleaseNotice::ReleaseExists { tag } => {
                write!(f, "Release exists for {}, skipping", tag)
            }
        }
    }
}
