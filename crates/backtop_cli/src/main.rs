//! Backtop CLI
//!
//! Inspect floating control settings and replay headless scenarios.
//!
//! - `backtop defaults` prints the default settings
//! - `backtop check <file>` validates a settings file and shows what would
//!   be applied on each form factor
//! - `backtop simulate <scenario>` drives the real presenter against a
//!   scripted headless document

mod config;
mod report;
mod runner;
mod scenario;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::SettingsFormat;
use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "backtop")]
#[command(author, version, about = "Floating back-to-top control tooling")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter (`RUST_LOG` syntax), overrides `RUST_LOG`
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default settings
    Defaults {
        /// Output format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: Format,
    },

    /// Validate a settings file (.json or .toml)
    Check {
        /// Settings file
        path: PathBuf,

        /// Print the resolved settings for both form factors
        #[arg(long)]
        effective: bool,
    },

    /// Replay a headless scenario
    Simulate {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Settings file replacing the scenario's own settings
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Write the JSON report to this relative path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Toml,
    Json,
}

impl From<Format> for SettingsFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Toml => SettingsFormat::Toml,
            Format::Json => SettingsFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Defaults { format } => cmd_defaults(format),
        Commands::Check { path, effective } => cmd_check(path, effective),
        Commands::Simulate {
            scenario,
            settings,
            report,
        } => cmd_simulate(scenario, settings, report),
    }
}

fn init_logging(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log filter `{}`", directive))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn cmd_defaults(format: Format) -> Result<()> {
    let rendered = config::render(&Default::default(), format.into())?;
    println!("{}", rendered);
    Ok(())
}

fn cmd_check(path: PathBuf, effective: bool) -> Result<()> {
    let settings = config::load_settings(&path)?;
    info!("{} is valid", path.display());

    if effective {
        println!("{}", config::describe_effective(&settings)?);
    } else {
        println!("{}: ok", path.display());
    }
    Ok(())
}

fn cmd_simulate(
    scenario_path: PathBuf,
    settings: Option<PathBuf>,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let mut scenario = Scenario::from_path(&scenario_path)
        .with_context(|| format!("Failed to load scenario {}", scenario_path.display()))?;
    if let Some(path) = settings {
        scenario.settings = config::load_settings(&path)?;
    }

    info!(
        "Running {} ({} steps)",
        scenario_path.display(),
        scenario.steps.len()
    );
    let report = runner::run(&scenario)?;

    if let Some(path) = report_path {
        report
            .write_to_path(&path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }
    report.write_to_writer(&mut std::io::stdout().lock())?;

    if report.is_failed() {
        std::process::exit(1);
    }
    Ok(())
}
