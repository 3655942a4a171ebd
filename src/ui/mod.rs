//! User interface module - rendering the outcome of each pass.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Rendering whole reports

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_notice, display_plans, display_status, display_success,
};

use crate::domain::SemverBump;
use crate::orchestrator::{PublishReport, ReconcileReport, TagMainReport};

pub fn display_tag_main_report(report: &TagMainReport, tag_scheme: &str) {
    for notice in &report.notices {
        display_notice(notice);
    }
    if report.plans.is_empty() {
        return;
    }

    display_plans(&report.plans, tag_scheme);
    if report.dry_run {
        display_status("Dry run: no files written, nothing committed, tagged or pushed");
        return;
    }

    if let Some(commit) = &report.commit {
        display_success(&format!("Committed and pushed {}", short(commit)));
    }
    for tag in &report.tags {
        display_success(&format!("Created and pushed tag {}", tag));
    }
}

pub fn display_reconcile_report(report: &ReconcileReport) {
    for notice in &report.notices {
        display_notice(notice);
    }
    for tag in &report.tags {
        if report.dry_run {
            display_status(&format!("Would create tag {}", tag));
        } else {
            display_success(&format!("Created and pushed tag {}", tag));
        }
    }
    if report.tags.is_empty() && report.notices.is_empty() {
        display_status("No descriptor changes; nothing to tag");
    }
}

pub fn display_publish_report(report: &PublishReport) {
    for notice in &report.notices {
        display_notice(notice);
    }
    for tag in &report.published {
        display_success(&format!("Created release {}", tag));
    }
}

/// `bump-level` prints the bare level for scripts.
pub fn display_bump_level(bump: SemverBump) {
    println!("{}", bump);
}

fn short(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}
