//! In-memory credential store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{Credential, CredentialStore, PasswordDigest, StoreError, User, UserId};

#[derive(Debug)]
struct StoredUser {
    username: String,
    password_hash: PasswordDigest,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoredUser {
    fn to_user(&self, id: UserId) -> User {
        User::new(id, self.username.clone(), self.created_at, self.updated_at)
    }
}

/// Users and the username index behind one lock, so the uniqueness check and the
/// insert happen under the same write guard
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, StoredUser>,
    username_index: HashMap<String, UserId>,
    next_id: i64,
}

/// In-memory implementation of CredentialStore
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCredentialStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: PasswordDigest,
    ) -> Result<UserId, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.username_index.contains_key(username) {
            return Err(StoreError::Conflict(username.to_string()));
        }

        tables.next_id += 1;
        let id = UserId::new(tables.next_id);
        let now = Utc::now();

        tables.username_index.insert(username.to_string(), id);
        tables.users.insert(
            id,
            StoredUser {
                username: username.to_string(),
                password_hash,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Credential, StoreError> {
        let tables = self.tables.read().await;

        let id = tables
            .username_index
            .get(username)
            .copied()
            .ok_or(StoreError::NotFound)?;
        let stored = tables.users.get(&id).ok_or(StoreError::NotFound)?;

        Ok(Credential {
            user_id: id,
            password_hash: stored.password_hash.clone(),
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, StoreError> {
        let tables = self.tables.read().await;

        tables
            .users
            .get(&id)
            .map(|stored| stored.to_user(id))
            .ok_or(StoreError::NotFound)
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: PasswordDigest,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        let stored = tables.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.password_hash = password_hash;
        stored.updated_at = Utc::now();

        Ok(())
    }
}
