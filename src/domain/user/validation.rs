//! Credential input validation

use thiserror::Error;

/// Errors that can occur during credential validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} bytes")]
    PasswordTooLong(usize),
}

/// Width of the `username` column
pub const MAX_USERNAME_LENGTH: usize = 255;

/// Upper bound on the plaintext fed to the hasher
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Validate a username
///
/// Usernames are case-sensitive and stored exactly as given, so no trimming or
/// normalization happens here.
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    if username.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    Ok(())
}

/// Validate a plaintext password
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
