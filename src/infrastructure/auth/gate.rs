//! Access gate in front of protected operations

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::jwt::TokenService;
use crate::domain::{DomainError, Identity};

/// Resolves a transported session token into an identity
///
/// Every failure (no token, malformed, bad signature, expired) becomes the same
/// `DomainError::Unauthorized`. The specific kind is only logged.
#[derive(Debug, Clone)]
pub struct AccessGate {
    tokens: Arc<dyn TokenService>,
}

impl AccessGate {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }

    pub fn authorize(&self, token: Option<&str>) -> Result<Identity, DomainError> {
        self.authorize_at(token, Utc::now())
    }

    pub fn authorize_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, DomainError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            debug!("Request carried no session token");
            return Err(DomainError::Unauthorized);
        };

        self.tokens.validate_at(token, now).map_err(|e| {
            debug!(reason = %e, "Session token rejected");
            DomainError::Unauthorized
        })
    }
}
