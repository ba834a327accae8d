//! Migrate command - applies the credential schema and exits

use anyhow::bail;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{connect_pool, run_credential_migrations};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    if config.storage.backend != StorageBackend::Postgres {
        bail!("migrations require storage.backend = \"postgres\"");
    }

    let pool = connect_pool(&crate::postgres_config(&config)?).await?;
    let applied = run_credential_migrations(&pool).await?;

    info!(applied, "Migrations complete");
    pool.close().await;

    Ok(())
}
