//! CLI definitions for ScrapeHub.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ScrapeHub CLI.
#[derive(Parser)]
#[command(name = "scrapehub")]
#[command(about = "Scheduled web-scraping hub")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/scrapehub.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the scheduler and HTTP API in foreground (default)
    Run {
        /// Server host, overriding `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Server port, overriding `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one job immediately and print its execution record
    RunJob {
        /// Job ID
        job_id: String,
    },

    /// Fetch jobs once and show which triggers would be installed
    Triggers,

    /// Validate the configuration file
    CheckConfig,
}
