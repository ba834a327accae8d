use thiserror::Error;

use super::user::UserValidationError;

/// Core domain errors
///
/// `InvalidCredentials` and `Unauthorized` intentionally carry no detail: an unknown
/// username must look the same as a wrong password, and an expired token the same as
/// a forged one.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Credential store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Token signing error: {message}")]
    Signing { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error comes from infrastructure rather than the caller's input
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::Signing { .. } | Self::Internal { .. }
        )
    }
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        Self::invalid_input(err.to_string())
    }
}
