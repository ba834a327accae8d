//! User domain
//!
//! Domain types and traits for stored credentials: user records, the opaque
//! password digest, input validation and the credential store contract.

mod entity;
mod repository;
mod validation;

pub use entity::{Credential, PasswordDigest, User, UserId};
pub use repository::{CredentialStore, StoreError};
pub use validation::{
    validate_password, validate_username, UserValidationError, MAX_PASSWORD_LENGTH,
    MAX_USERNAME_LENGTH,
};

#[cfg(test)]
pub use repository::MockCredentialStore;
