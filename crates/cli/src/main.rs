//! tlverify CLI - Main Entry Point
//!
//! Exit status: 0 when the check passed, 1 when it ran and found a
//! problem (missing images, a failed interaction step), 2 when it could
//! not run at all (missing asset directory, bad configuration, browser
//! launch failure).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tlverify_cli::commands::{assets, config, interact, Outcome};
use tlverify_cli::output::{print_error, OutputFormat};
use tlverify_common::{Config, DEFAULT_CONFIG_FILE};

/// tlverify - asset and interaction checks for the timeline app
#[derive(Parser)]
#[command(name = "tlverify")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML); defaults apply when it does not exist
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "plain", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every image reference in the data files exists on disk
    Assets(assets::AssetsArgs),

    /// Drive a headless browser through the interaction script
    Interact(interact::InteractArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Assets(args) => assets::execute(args, &config, cli.format),
        Commands::Interact(args) => interact::execute(args, &config, cli.format).await,
        Commands::Config(cmd) => {
            config::execute(cmd, &config, cli.format)?;
            Ok(Outcome::Passed)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for reports
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(Outcome::Passed) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::from(1),
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}
