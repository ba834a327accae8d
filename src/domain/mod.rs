//! Domain layer - core types, traits and errors of the credential lifecycle

pub mod auth;
pub mod error;
pub mod user;

pub use auth::{Identity, IssuedToken};
pub use error::DomainError;
pub use user::{Credential, CredentialStore, PasswordDigest, StoreError, User, UserId};
