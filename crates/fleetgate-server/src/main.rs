//! Fleetgate Server — application entry point.

use fleetgate_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fleetgate=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Fleetgate server...");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Fleetgate server failed");
        std::process::exit(1);
    }

    tracing::info!("Fleetgate server stopped.");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // TODO: Load configuration from environment/file
    let config = DbConfig::default();

    let manager = DbManager::connect(&config).await?;
    fleetgate_db::run_migrations(manager.client()).await?;

    // Default tenant for the seeded built-in roles; replaced once
    // configuration loading lands.
    let default_tenant = Uuid::nil();
    fleetgate_db::seed_builtin_catalog(manager.client(), default_tenant).await?;

    // TODO: Start REST API server

    Ok(())
}
