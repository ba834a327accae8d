//! Credential authentication service
//!
//! Registers users with Argon2id password digests, logs them in with signed,
//! expiring session tokens and gates the profile lookup behind those tokens.
//! Credentials live in memory or in PostgreSQL.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use api::{auth::SessionCookie, state::AppState};
use crate::config::{ConfigError, StorageBackend};
use domain::CredentialStore;
use infrastructure::{
    auth::{AccessGate, JwtService},
    storage::{connect_pool, run_credential_migrations, PostgresConfig},
    user::{Argon2Hasher, AuthService, InMemoryCredentialStore, PostgresCredentialStore},
};
use tracing::info;

/// Create the application state for the configured storage backend
///
/// The PostgreSQL backend connects and applies pending migrations first.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn CredentialStore> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory credential store");
            Arc::new(InMemoryCredentialStore::new())
        }
        StorageBackend::Postgres => {
            let pool = connect_pool(&postgres_config(config)?).await?;
            let applied = run_credential_migrations(&pool).await?;
            info!(applied, "Using PostgreSQL credential store");
            Arc::new(PostgresCredentialStore::new(pool))
        }
    };

    build_app_state(config, store).await
}

/// Wire services around an existing credential store
pub async fn build_app_state(
    config: &AppConfig,
    store: Arc<dyn CredentialStore>,
) -> anyhow::Result<AppState> {
    let tokens = Arc::new(JwtService::new(config.auth.jwt_secret()?)?);
    let hasher = Arc::new(Argon2Hasher::with_params(
        config.auth.hash_memory_kib,
        config.auth.hash_iterations,
        config.auth.hash_parallelism,
    )?);

    let auth_service =
        AuthService::new(store, hasher, tokens.clone(), config.auth.token_ttl()).await?;

    Ok(AppState::new(
        Arc::new(auth_service),
        AccessGate::new(tokens),
        SessionCookie::from_config(&config.auth),
    ))
}

/// Pool settings for the PostgreSQL backend
pub fn postgres_config(config: &AppConfig) -> Result<PostgresConfig, ConfigError> {
    let storage = &config.storage;

    Ok(PostgresConfig::new(storage.database_url()?)
        .with_max_connections(storage.max_connections)
        .with_min_connections(storage.min_connections)
        .with_connect_timeout(storage.connect_timeout_secs)
        .with_idle_timeout(storage.idle_timeout_secs))
}
