//! demand - build and run programs on demand
//!
//! CLI entry point, usually reached through a `#!/usr/bin/env demand` line.

use clap::Parser;
use console::style;
use demand::cli::Cli;
use demand::config::ConfigManager;
use demand::error::DemandResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DemandResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("demand=warn"),
        1 => EnvFilter::new("demand=info"),
        _ => EnvFilter::new("demand=debug"),
    };

    // stdout belongs to the launched program
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Config file: {}", config_manager.path().display());
    let config = config_manager.load().await?;

    if cli.build {
        demand::cli::commands::build(&cli, &config).await
    } else {
        demand::cli::commands::run(&cli, &config).await
    }
}
