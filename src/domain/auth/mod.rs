//! Session identity types
//!
//! An [`Identity`] is what a valid session token asserts; an [`IssuedToken`] is the
//! opaque artifact handed to the client at login.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::UserId;

/// Authenticated subject resolved from a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

/// Signed session token with its absolute expiry
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[hidden]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_debug_hides_token() {
        let issued = IssuedToken {
            token: "eyJhbGciOiJIUzI1NiJ9.payload.signature".to_string(),
            expires_at: Utc::now(),
        };

        let debug = format!("{:?}", issued);
        assert!(debug.contains("[hidden]"));
        assert!(!debug.contains("eyJhbGciOiJIUzI1NiJ9"));
    }

    #[test]
    fn test_identity_serialization() {
        let identity = Identity::new(UserId::new(9), "alice");
        let json = serde_json::to_value(&identity).unwrap();

        assert_eq!(json["user_id"], 9);
        assert_eq!(json["username"], "alice");
    }
}
