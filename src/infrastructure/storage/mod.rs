//! Storage infrastructure - PostgreSQL pooling and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{credential_migrations, run_credential_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
