//! ScrapeHub - scheduled web-scraping hub
//!
//! Main entry point for the ScrapeHub CLI and server.

mod cli;
mod commands;
mod server;
mod wiring;

use std::path::Path;

use clap::Parser;
use tracing::{error, warn};

use scrapehub_config::{Config, ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Run {
        host: None,
        port: None,
    });

    match command {
        Commands::Run { host, port } => {
            let config = setup(&cli.config, true)?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            server::run_server(config, host, port).await
        }
        Commands::RunJob { job_id } => {
            let config = setup(&cli.config, true)?;
            commands::run_job(&config, &job_id).await
        }
        Commands::Triggers => {
            // Listing triggers only needs the job store.
            let config = setup(&cli.config, false)?;
            commands::show_triggers(&config).await
        }
        Commands::CheckConfig => commands::check_config(&cli.config),
    }
}

/// Load config, start tracing and log validation findings.
///
/// With `strict`, the first validation error aborts.
fn setup(path: &Path, strict: bool) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    server::init_tracing(&config.logging)?;

    let result = ConfigValidator::validate(&config);
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if strict {
        result.into_result()?;
    } else {
        for err in &result.errors {
            error!("Config {}: {}", err.path, err.message);
        }
    }
    Ok(config)
}
