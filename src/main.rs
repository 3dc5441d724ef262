mod actor_framework;
mod app_system;
mod clients;
mod domain;
mod error;
mod query;
mod shell;

#[cfg(test)]
mod mock_framework;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::{error, info};

use crate::app_system::{setup_tracing, AppConfig, CommerceSystem};
use crate::shell::Shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Setup tracing once for the entire application
    setup_tracing(&config.default_log_filter);
    info!(?config, "Starting order desk");

    let system = CommerceSystem::open(config)
        .await
        .context("Failed to load the database snapshot")?;

    let session = Shell::new(&system, BufReader::new(tokio::io::stdin()), std::io::stdout())
        .run()
        .await;
    if let Err(e) = &session {
        error!(error = %e, "Session aborted");
    }

    // Shutdown system gracefully
    system.shutdown().await.context("Failed to save the database snapshot")?;
    session
}
