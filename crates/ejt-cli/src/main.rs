use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ejt_cli::commands::{calendar, check, resource, status, watch, work};
use ejt_cli::{Cli, Commands, Config};
use ejt_client::Client;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let client =
        Arc::new(Client::new(&config.credentials()).context("failed to build API client")?);
    let mut stdout = std::io::stdout();

    match &cli.command {
        Commands::Status { date, json } => {
            status::run(&mut stdout, &client, *date, *json).await?;
        }
        Commands::Start => {
            work::start(&mut stdout, &client).await?;
        }
        Commands::Stop => {
            work::stop(&mut stdout, &client).await?;
        }
        Commands::Calendar { days, all, json } => {
            calendar::run(&mut stdout, &client, &config, *days, *all, *json).await?;
        }
        Commands::ResourceStates => {
            resource::list(&mut stdout, &client).await?;
        }
        Commands::SetResourceState { state, start, end } => {
            resource::set_state(&mut stdout, &client, state, *start, *end).await?;
        }
        Commands::Check => {
            check::run(&mut stdout, &client).await?;
        }
        Commands::Watch => {
            watch::run(client, &config).await?;
        }
    }

    Ok(())
}
