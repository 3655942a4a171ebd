use crate::error::{ReleaseError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref SEMVER_RE: Regex = Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").unwrap();
}

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a strict `MAJOR.MINOR.PATCH` string.
    ///
    /// No prefixes, pre-release or build suffixes are accepted: a stored
    /// version that does not match exactly is an error, never a default.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_from(text, "version string")
    }

    /// Same as [`Version::parse`], naming `source_name` in the error.
    pub fn parse_from(text: &str, source_name: &str) -> Result<Self> {
        let caps = SEMVER_RE
            .captures(text)
            .ok_or_else(|| ReleaseError::invalid_version(text, source_name))?;

        let component = |i: usize| -> Result<u64> {
            caps[i]
                .parse::<u64>()
                .map_err(|_| ReleaseError::invalid_version(text, source_name))
        };

        Ok(Version {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }

    /// Bump version according to bump level.
    ///
    /// A component that would overflow `u64` is an `InvalidVersionFormat`
    /// error naming `source_name`.
    pub fn bump(&self, level: SemverBump, source_name: &str) -> Result<Self> {
        let overflow = || ReleaseError::invalid_version(self.to_string(), source_name);
        Ok(match level {
            SemverBump::None => *self,
            SemverBump::Major => Version {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            SemverBump::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            SemverBump::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Severity of a version increment.
///
/// Variant order is the severity order, so `Ord` gives
/// `None < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SemverBump {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl SemverBump {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemverBump::None => "none",
            SemverBump::Patch => "patch",
            SemverBump::Minor => "minor",
            SemverBump::Major => "major",
        }
    }
}

impl fmt::Display for SemverBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
