mod cleanup;
mod cli;
mod config;
mod error;
#[cfg(test)]
mod fake_registry;
mod models;
mod output;
mod registry;
mod retention;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use cleanup::Cleaner;
use cli::Cli;
use config::Config;
use output::print_summary;
use registry::RegistryClient;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting registry cleanup");

    let config = Config::from_cli(&cli).context("Configuration error")?;
    info!(
        registry = %config.registry,
        ttl = %config.policy.ttl,
        except = ?config.policy.exclusions,
        "Configuration is valid"
    );

    let client = RegistryClient::new(&config.registry);

    info!("Checking registry is alive");
    client
        .check()
        .await
        .context("Registry checking error")?;
    info!("Registry is alive");

    info!("Cleaning up");
    let cleaner = Cleaner::new(client, config.policy);
    let summary = cleaner.run().await.context("Can't delete images")?;

    info!("Cleanup finished");
    print_summary(&summary);

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("regsweep={}", level)));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
