//! `pantry` server binary.

use anyhow::Context;
use pantry_api::{build_server, telemetry, AppConfig};
use pantry_core::DatabasePool;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(
        version = pantry_core::VERSION,
        address = %config.address,
        pool_size = config.pool_size,
        "Starting pantry"
    );

    let pool = Arc::new(
        DatabasePool::connect(&config.database_url, config.pool_size)
            .await
            .context("failed to connect to the database")?,
    );
    let server = build_server(pool.clone(), &config).context("failed to register routes")?;

    let served = server.serve().await;
    pool.close().await;
    info!("Database pool closed");

    served.context("server stopped with an error")
}
