//! User infrastructure module
//!
//! Argon2 password hashing, the in-memory and PostgreSQL credential stores, and the
//! authentication workflow built on them.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, HashError, PasswordHasher};
pub use postgres_repository::PostgresCredentialStore;
pub use repository::InMemoryCredentialStore;
pub use service::AuthService;
