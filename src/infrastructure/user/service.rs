//! Authentication workflow: registration, login and profile lookup

use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::domain::user::{
    validate_password, validate_username, CredentialStore, PasswordDigest, StoreError, User,
    UserId,
};
use crate::domain::{DomainError, Identity, IssuedToken};
use crate::infrastructure::auth::{TokenError, TokenService};

use super::password::{HashError, PasswordHasher};

/// Plaintext behind the digest verified for unknown usernames
const TIMING_DUMMY_PASSWORD: &str = "timing-equalization-dummy";

/// Orchestrates the credential store, the password hasher and the token service
///
/// Hashing and verification run on the blocking thread pool; no store lock is held
/// while they execute.
#[derive(Debug)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    token_ttl: Duration,
    dummy_digest: PasswordDigest,
}

impl AuthService {
    /// Create a new auth service
    ///
    /// Computes one throwaway digest up front so that logins for unknown usernames
    /// cost one verification, the same as a wrong password.
    pub async fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        token_ttl: Duration,
    ) -> Result<Self, DomainError> {
        if token_ttl <= Duration::zero() {
            return Err(DomainError::signing("token ttl must be positive"));
        }

        let dummy_digest = hash_blocking(Arc::clone(&hasher), TIMING_DUMMY_PASSWORD).await?;

        Ok(Self {
            store,
            hasher,
            tokens,
            token_ttl,
            dummy_digest,
        })
    }

    /// Lifetime of tokens issued at login
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Register a new user
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, DomainError> {
        validate_username(username)?;
        validate_password(password)?;

        let digest = self.hash_password(password).await?;

        match self.store.create_user(username, digest).await {
            Ok(id) => {
                info!(user_id = %id, "User registered");
                Ok(id)
            }
            Err(StoreError::Conflict(_)) => {
                info!("Registration rejected: username already exists");
                Err(DomainError::UsernameTaken)
            }
            Err(e) => Err(store_error(e)),
        }
    }

    /// Authenticate a user and issue a session token
    ///
    /// Unknown usernames and wrong passwords both end in `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, DomainError> {
        validate_username(username)?;
        validate_password(password)?;

        let (user_id, digest) = match self.store.find_by_username(username).await {
            Ok(credential) => (Some(credential.user_id), credential.password_hash),
            Err(StoreError::NotFound) => (None, self.dummy_digest.clone()),
            Err(e) => return Err(store_error(e)),
        };

        let verified = self.verify_password(password, digest).await?;

        let user_id = match user_id {
            Some(id) if verified => id,
            _ => {
                warn!("Login failed: invalid credentials");
                return Err(DomainError::InvalidCredentials);
            }
        };

        let identity = Identity::new(user_id, username);
        let issued = self
            .tokens
            .issue(&identity, self.token_ttl)
            .map_err(token_error)?;

        info!(user_id = %user_id, expires_at = %issued.expires_at, "User logged in");

        Ok(issued)
    }

    /// Look up the profile of an authenticated identity
    #[instrument(skip(self), fields(user_id = %identity.user_id))]
    pub async fn profile(&self, identity: &Identity) -> Result<User, DomainError> {
        match self.store.find_by_id(identity.user_id).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => Err(DomainError::not_found("User not found")),
            Err(e) => Err(store_error(e)),
        }
    }

    /// Check that the credential store is reachable
    pub async fn ready(&self) -> Result<(), DomainError> {
        self.store.ping().await.map_err(store_error)
    }

    async fn hash_password(&self, password: &str) -> Result<PasswordDigest, DomainError> {
        hash_blocking(Arc::clone(&self.hasher), password).await
    }

    async fn verify_password(
        &self,
        password: &str,
        digest: PasswordDigest,
    ) -> Result<bool, DomainError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| {
                DomainError::internal(format!("Password verification task failed: {}", e))
            })?
            .map_err(hash_error)
    }
}

async fn hash_blocking(
    hasher: Arc<dyn PasswordHasher>,
    password: &str,
) -> Result<PasswordDigest, DomainError> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
        .map_err(hash_error)
}

fn store_error(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound => DomainError::not_found("User not found"),
        StoreError::Conflict(_) => DomainError::UsernameTaken,
        StoreError::Unavailable(message) => DomainError::store_unavailable(message),
    }
}

fn hash_error(err: HashError) -> DomainError {
    DomainError::internal(err.to_string())
}

fn token_error(err: TokenError) -> DomainError {
    match err {
        TokenError::Signing(message) => DomainError::signing(message),
        other => DomainError::internal(other.to_string()),
    }
}
