use crate::domain::{Package, SemverBump, Version};

/// A computed release for one package, applied and discarded within one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub package: Package,
    pub reference_tag: Option<String>,
    pub current_version: Version,
    pub next_version: Version,
    pub bump: SemverBump,
}

impl ReleasePlan {
    pub fn tag_name(&self, scheme: &str) -> String {
        self.package.tag_name(scheme, &self.next_version)
    }
}

/// Message of the single commit that carries every planned bump
pub fn release_commit_message(plans: &[ReleasePlan]) -> String {
    let parts: Vec<String> = plans
        .iter()
        .map(|p| format!("{} v{}", p.package.name, p.next_version))
        .collect();
    format!("chore(release): {}", parts.join(", "))
}

/// Message of an annotated release tag
pub fn tag_message(tag: &str) -> String {
    format!("Release {}", tag)
}
