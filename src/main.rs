// src/main.rs

//! coderoute
//!
//! Entry point for the coderoute CLI. All real work lives in the library;
//! this file only parses arguments, sets up logging and hands off to the
//! runner.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use coderoute::{cli, runner};

/// Uses Tokio because child processes and model calls are awaited
/// asynchronously under deadlines.
#[tokio::main]
async fn main() -> Result<()> {
    // API keys may live in a local .env file
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries only results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coderoute=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    runner::run(cli).await
}
