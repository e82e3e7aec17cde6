//! dataverse-lint CLI tool.
//!
//! Usage:
//! ```bash
//! dataverse-lint check [OPTIONS] [PATH]
//! dataverse-lint fix [OPTIONS] [PATH]
//! dataverse-lint list-rules
//! dataverse-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter for C# Dataverse plugin code
#[derive(Parser)]
#[command(name = "dataverse-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules, by code or name (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Number of worker threads
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Apply automatic fixes (CT0001, CT0004)
    Fix {
        /// Path to fix (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only apply fixes of specific rules (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Print the files that would change without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
    /// Source snippets rendered through miette.
    Rich,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            exclude,
            jobs,
        } => {
            let resolved = config_resolver::load(&path, cli.config.as_deref())?;
            resolved.log_origin();
            let options = commands::check::CheckOptions {
                format,
                rules,
                exclude,
                jobs,
            };
            commands::check::run(&path, &options, resolved.config)
        }
        Commands::Fix {
            path,
            rules,
            dry_run,
        } => {
            let resolved = config_resolver::load(&path, cli.config.as_deref())?;
            resolved.log_origin();
            commands::fix::run(&path, rules.as_deref(), dry_run, resolved.config)
        }
        Commands::ListRules => {
            commands::list_rules::run()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
