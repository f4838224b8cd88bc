//! # cvault CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, loads
//! configuration, and dispatches to the command handler.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cvault_cli::commands::{exit_code, run_command, Command};
use cvault_cli::state::load_config;

/// Credential vault CLI.
///
/// Owners register document fingerprints and decide which verifiers may
/// check them; verifiers submit fingerprints and get a recorded match or
/// mismatch.
#[derive(Parser, Debug)]
#[command(name = "cvault", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the ledger state file.
    #[arg(long, global = true, default_value = "cvault-state.json")]
    state: PathBuf,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!(state = %cli.state.display(), "cvault CLI starting");

    let result = load_config(cli.config.as_deref())
        .and_then(|config| run_command(&cli.command, &cli.state, &config));

    if let Err(e) = &result {
        tracing::error!("{e:#}");
    }
    ExitCode::from(exit_code(&result))
}
