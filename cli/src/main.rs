//! # Dashgraft Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the dashgraft CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - `codemod`: project detection, router classification and the source
//!   edits (import injection, router patching, template import rewriting)
//! - `commands`: one module per top-level command
//! - `common`: filesystem helpers, backups, process execution, output
//! - `core`: errors, configuration, templating
//!
//! All errors propagate to this level, are logged, printed as
//! `Error: <message>` and turn into exit code 1.
//!
//! ## Examples
//!
//! ```bash
//! dashgraft install --dry-run
//! dashgraft -vv install ../shop --base /admin
//! dashgraft detect
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod codemod; // Detection, classification and source edits
mod commands; // Command handlers (install, detect, package, backups)
mod common; // Shared utilities (fs, process, ui)
mod core; // Core infrastructure (errors, config, templating)

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "dashgraft",
    about = "Installs a prebuilt dashboard module into an existing React project",
    long_about = "Copies the dashboard template into a React project, adds its dependencies,\n\
                  imports its stylesheet and registers its route with the project's router.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// All available top-level commands.
#[derive(Parser, Debug)]
enum Commands {
    /// Install the dashboard into a React project.
    #[command(alias = "i")]
    Install(commands::install::InstallArgs),
    /// Show what install would detect, without changing anything.
    Detect(commands::detect::DetectArgs),
    /// Rewrite a dashboard source tree into a self-contained template.
    Package(commands::package::PackageArgs),
    /// List backups written by earlier installs.
    Backups(commands::backups::BackupsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Install(args) => commands::install::handle_install(args).await,
        Commands::Detect(args) => commands::detect::handle_detect(args).await,
        Commands::Package(args) => commands::package::handle_package(args).await,
        Commands::Backups(args) => commands::backups::handle_backups(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
