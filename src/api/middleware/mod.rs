//! API middleware components

pub mod logging;
pub mod security;
pub mod session;

pub use logging::logging_middleware;
pub use security::security_headers_middleware;
pub use session::{extract_session_token, require_session, Authenticated};
