//! PostgreSQL credential store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::user::{Credential, CredentialStore, PasswordDigest, StoreError, User, UserId};

/// PostgreSQL implementation of CredentialStore
///
/// Username uniqueness is enforced by the `UNIQUE` constraint on `users.username`;
/// `create_user` is a single `INSERT` and never reads before writing.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: PasswordDigest,
    ) -> Result<UserId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, password_hash, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, username))?;

        Ok(UserId::new(id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable("Failed to get user by username", e))?
        .ok_or(StoreError::NotFound)?;

        let id: i64 = row.get("id");
        let password_hash: String = row.get("password_hash");

        Ok(Credential {
            user_id: UserId::new(id),
            password_hash: PasswordDigest::new(password_hash),
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unavailable("Failed to get user", e))?
        .ok_or(StoreError::NotFound)?;

        Ok(row_to_user(&row))
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: PasswordDigest,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(password_hash.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| unavailable("Failed to update password hash", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| unavailable("Database ping failed", e))?;

        Ok(())
    }
}

fn row_to_user(row: &sqlx::postgres::PgRow) -> User {
    let id: i64 = row.get("id");
    let username: String = row.get("username");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    User::new(UserId::new(id), username, created_at, updated_at)
}

fn map_insert_error(err: sqlx::Error, username: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(username.to_string());
        }
    }

    unavailable("Failed to create user", err)
}

fn unavailable(context: &str, err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {}", context, err))
}
