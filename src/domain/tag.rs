use crate::domain::Version;

/// A tag as listed from the repository.
///
/// `created` is the tagger time for annotated tags and the commit time for
/// lightweight ones. `sequence` is the position in the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub created: i64,
    pub sequence: usize,
}

impl TagRef {
    pub fn new(name: impl Into<String>, created: i64, sequence: usize) -> Self {
        TagRef {
            name: name.into(),
            created,
            sequence,
        }
    }
}

/// Pick the most recent of a package's tags.
///
/// Newest `created` wins. Tags created in the same second fall back to the
/// higher version suffix after `prefix`, then to the later `sequence`, so the
/// choice never depends on listing order alone.
pub fn select_latest<'t>(tags: &'t [TagRef], prefix: &str) -> Option<&'t TagRef> {
    tags.iter().max_by_key(|tag| {
        let version = tag
            .name
            .strip_prefix(prefix)
            .and_then(|suffix| Version::parse(suffix).ok());
        (tag.created, version, tag.sequence)
    })
}
