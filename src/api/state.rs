//! Application state shared by handlers

use std::sync::Arc;

use crate::api::auth::SessionCookie;
use crate::infrastructure::auth::AccessGate;
use crate::infrastructure::user::AuthService;

#[derive(Debug, Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub access_gate: AccessGate,
    pub session_cookie: SessionCookie,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        access_gate: AccessGate,
        session_cookie: SessionCookie,
    ) -> Self {
        Self {
            auth_service,
            access_gate,
            session_cookie,
        }
    }
}
