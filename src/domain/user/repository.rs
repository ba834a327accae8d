//! Credential store trait

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use super::entity::{Credential, PasswordDigest, User, UserId};

#[cfg(test)]
use mockall::automock;

/// Errors reported by a credential store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Username '{0}' already exists")]
    Conflict(String),

    #[error("User not found")]
    NotFound,

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// Durable mapping from username to identity and password hash
///
/// `create_user` must be atomic with respect to the username: of N concurrent calls
/// with the same username exactly one succeeds and the others get `Conflict`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Create a user and return the id assigned to it
    async fn create_user(
        &self,
        username: &str,
        password_hash: PasswordDigest,
    ) -> Result<UserId, StoreError>;

    /// Look up the id and hash for a login attempt
    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError>;

    /// Look up a user by id
    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError>;

    /// Replace the stored hash of an existing user
    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: PasswordDigest,
    ) -> Result<(), StoreError>;

    /// Check that the backing storage is reachable
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
