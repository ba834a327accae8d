//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;
use thiserror::Error;
use tracing::warn;

use crate::domain::PasswordDigest;

/// Errors raised by a password hasher
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Stored password hash is corrupt: {0}")]
    InvalidHash(String),
}

/// Trait for password hashing operations
///
/// Both operations are CPU-bound and block the calling thread.
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password with a fresh random salt
    fn hash(&self, password: &str) -> Result<PasswordDigest, HashError>;

    /// Verify a password against a stored digest in constant time
    ///
    /// Returns `Ok(false)` on mismatch and for well-formed digests this hasher cannot
    /// check. Fails with `InvalidHash` only when the digest is not a parseable PHC string.
    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, HashError>;
}

/// Argon2id hasher
///
/// Cost parameters only apply to new hashes. Verification uses the parameters
/// embedded in the stored PHC string.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher with the argon2 crate's recommended parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hasher with explicit cost parameters
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, HashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| HashError::Hashing(format!("invalid argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordDigest::new(hash.to_string()))
            .map_err(|e| HashError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, HashError> {
        let parsed_hash = PasswordHash::new(digest.as_str())
            .map_err(|e| HashError::InvalidHash(e.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be verified");
                Ok(false)
            }
        }
    }
}
