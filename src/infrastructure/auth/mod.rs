//! Authentication infrastructure module
//!
//! Session token issuing/validation and the access gate built on it.

mod gate;
mod jwt;

pub use gate::AccessGate;
pub use jwt::{JwtService, SessionClaims, TokenError, TokenService, TOKEN_ALGORITHM};
