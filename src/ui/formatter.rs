//! Pure formatting functions for UI output.
//!
//! Everything that goes to stdout (other than detect-changed JSON) is built
//! here, styled with `console` so colours disappear when output is piped.

use console::style;

use crate::domain::ReleasePlan;
use crate::notice::ReleaseNotice;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Non-fatal notices go to stderr so stdout stays parseable.
pub fn display_notice(notice: &ReleaseNotice) {
    eprintln!("{} {}", style("⚠").yellow(), notice);
}

/// One line per plan, e.g. `filesystem  0.1.0 -> 0.2.0 (minor)`
pub fn format_plan_line(plan: &ReleasePlan, name_width: usize) -> String {
    format!(
        "{:<width$}  {} -> {} ({})",
        plan.package.name,
        plan.current_version,
        plan.next_version,
        plan.bump,
        width = name_width
    )
}

/// Display planned bumps, aligned on the package name.
pub fn display_plans(plans: &[ReleasePlan], tag_scheme: &str) {
    let width = plans
        .iter()
        .map(|p| p.package.name.len())
        .max()
        .unwrap_or(0);

    println!("\n{}", style("Planned releases:").bold());
    for plan in plans {
        println!(
            "  {}  {}",
            format_plan_line(plan, width),
            style(plan.tag_name(tag_scheme)).cyan()
        );
    }
}
