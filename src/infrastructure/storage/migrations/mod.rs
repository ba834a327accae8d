//! Database migrations infrastructure

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version, strictly increasing
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// Applies versioned migrations, tracking them in a `_migrations` table
///
/// Each migration runs in its own transaction together with its bookkeeping row.
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create migrations table", e))?;

        Ok(())
    }

    /// Apply every migration not yet recorded; returns how many ran
    pub async fn run(&self, migrations: &[Migration]) -> Result<usize, DomainError> {
        self.ensure_migrations_table().await?;

        let applied = self.applied_versions().await?;
        let mut count = 0;

        for migration in migrations {
            if applied.contains(&migration.version) {
                continue;
            }

            self.apply(migration).await?;
            count += 1;
        }

        Ok(count)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to start migration transaction", e))?;

        sqlx::raw_sql(&migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error(&format!("Failed to run migration {}", migration.version), e))?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                storage_error(&format!("Failed to record migration {}", migration.version), e)
            })?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit migration", e))?;

        info!(
            version = migration.version,
            description = %migration.description,
            "Applied migration"
        );

        Ok(())
    }

    /// All applied migration versions, ascending
    pub async fn applied_versions(&self) -> Result<Vec<i64>, DomainError> {
        sqlx::query_scalar("SELECT version FROM _migrations ORDER BY version")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get applied migrations", e))
    }
}

fn storage_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::store_unavailable(format!("{}: {}", context, err))
}

/// Schema owned by the credential store
pub fn credential_migrations() -> Vec<Migration> {
    vec![Migration::new(
        1,
        "Create users table",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            username VARCHAR(255) NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT users_username_key UNIQUE (username)
        );
        "#,
    )]
}

/// Apply all pending credential store migrations
pub async fn run_credential_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    PostgresMigrator::new(pool.clone())
        .run(&credential_migrations())
        .await
}
