use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mono_release::config;
use mono_release::git::{Git2Repository, Repository};
use mono_release::orchestrator::{GhCli, Orchestrator};
use mono_release::ui;

#[derive(Parser)]
#[command(
    name = "mono-release",
    version,
    about = "Version, tag and publish the packages of a monorepo from conventional commits"
)]
struct Cli {
    #[arg(long, global = true, help = "Repository root (default: discovered from the current directory)")]
    repo: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a JSON array of packages changed since their last release
    DetectChanged,

    /// Bump, commit and tag every changed package
    TagMain {
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },

    /// Create hosted release records for the latest tags
    CreateReleases,

    /// Tag packages whose descriptor changed between two revisions
    TagOnMerge {
        before: String,
        after: String,
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },

    /// Print the bump level of one package since a revision
    BumpLevel { package: String, since: Option<String> },
}

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if let Err(e) = run(cli) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout is reserved for command output.
fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::try_new("mono_release=debug,warn").unwrap_or_else(|_| EnvFilter::new("warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if debug {
        tracing::debug!("Debug logging enabled");
    }
}

fn run(cli: Cli) -> Result<()> {
    let start = cli.repo.clone().unwrap_or_else(|| PathBuf::from("."));
    let repo = Git2Repository::open(&start)
        .with_context(|| format!("Cannot open git repository at {}", start.display()))?;
    let config = config::load_config(cli.config.as_deref(), repo.workdir())
        .context("Failed to load configuration")?;
    let orchestrator = Orchestrator::new(&repo, config)?;

    match cli.command {
        Command::DetectChanged => {
            let names: Vec<String> = orchestrator
                .changed_packages()?
                .into_iter()
                .map(|p| p.name)
                .collect();
            println!("{}", serde_json::to_string(&names)?);
        }
        Command::TagMain { dry_run } => {
            let report = orchestrator.tag_main(dry_run)?;
            ui::display_tag_main_report(&report, &orchestrator.config().tag_scheme);
        }
        Command::CreateReleases => {
            let host = GhCli::new(repo.workdir());
            let report = orchestrator.publish(&host)?;
            ui::display_publish_report(&report);
        }
        Command::TagOnMerge {
            before,
            after,
            dry_run,
        } => {
            let report = orchestrator.reconcile(&before, &after, dry_run)?;
            ui::display_reconcile_report(&report);
        }
        Command::BumpLevel { package, since } => {
            let bump = orchestrator.bump_level(&package, since.as_deref())?;
            ui::display_bump_level(bump);
        }
    }

    Ok(())
}
