//! Domain logic - pure release rules independent of git operations

pub mod commit;
pub mod package;
pub mod plan;
pub mod tag;
pub mod version;

pub use commit::Commit;
pub use package::Package;
pub use plan::ReleasePlan;
pub use tag::TagRef;
pub use version::{SemverBump, Version};
