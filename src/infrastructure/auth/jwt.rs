//! Session token issuing and validation with HS256 JWTs

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::{Identity, IssuedToken, UserId};

/// The only algorithm tokens are signed with or accepted under
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token failure kinds
///
/// These stay internal: the access gate collapses all of them into one
/// `Unauthorized` outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Invalid token signature or algorithm")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Username
    pub username: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl SessionClaims {
    /// Create claims for an identity issued at `now`
    ///
    /// `exp` is rounded up to the next whole second so a token never expires before
    /// `now + ttl`.
    pub fn new(identity: &Identity, now: DateTime<Utc>, ttl: Duration) -> Result<Self, TokenError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".to_string()))?;

        let exp = if expires_at.timestamp_subsec_nanos() > 0 {
            expires_at.timestamp() + 1
        } else {
            expires_at.timestamp()
        };

        Ok(Self {
            sub: identity.user_id.to_string(),
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp,
        })
    }

    /// A token is expired at its expiry instant, not only after it
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Identity asserted by the claims
    pub fn identity(&self) -> Result<Identity, TokenError> {
        let id: i64 = self
            .sub
            .parse()
            .map_err(|_| TokenError::Malformed("subject is not a user id".to_string()))?;

        Ok(Identity::new(UserId::new(id), self.username.clone()))
    }
}

/// Trait for session token operations
pub trait TokenService: Send + Sync + Debug {
    /// Issue a token for `identity` that expires `ttl` after `now`
    fn issue_at(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError>;

    /// Validate a token as of `now` and return the identity it asserts
    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError>;

    fn issue(&self, identity: &Identity, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, ttl, Utc::now())
    }

    fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        self.validate_at(token, Utc::now())
    }
}

/// JWT service signing with a process-wide symmetric secret
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a JWT service from the signing secret
    ///
    /// An empty secret is a configuration error and is rejected here rather than at
    /// the first login.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::Signing("signing secret is empty".to_string()));
        }

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against the caller's clock in `validate_at`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl TokenService for JwtService {
    fn issue_at(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        if ttl <= Duration::zero() {
            return Err(TokenError::Signing("token ttl must be positive".to_string()));
        }

        let claims = SessionClaims::new(identity, now, ttl)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Signing("token expiry out of range".to_string()))?;

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        let header = decode_header(token).map_err(|e| match advertised_algorithm(token) {
            // Headers jsonwebtoken cannot represent, such as `"alg":"none"`
            Some(alg) if alg != "HS256" => TokenError::BadSignature,
            _ => TokenError::Malformed(e.to_string()),
        })?;

        if header.alg != TOKEN_ALGORITHM {
            return Err(TokenError::BadSignature);
        }

        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            },
        )?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        data.claims.identity()
    }
}

/// Read the raw `alg` field of a token header without interpreting it
fn advertised_algorithm(token: &str) -> Option<String> {
    let header_segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(header_segment).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    header.get("alg")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "test-secret-key-for-jwt";

    fn service() -> JwtService {
        JwtService::new(SECRET).unwrap()
    }

    fn alice() -> Identity {
        Identity::new(UserId::new(1), "alice")
    }

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn b64(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn test_issue_and_validate() {
        let service = service();

        let issued = service.issue(&alice(), Duration::hours(1)).unwrap();
        assert!(!issued.token.is_empty());
        assert!(issued.expires_at > Utc::now());

        let identity = service.validate(&issued.token).unwrap();
        assert_eq!(identity, alice());
    }

    #[test]
    fn test_expires_at_matches_ttl() {
        let issued = service()
            .issue_at(&alice(), Duration::seconds(60), t0())
            .unwrap();

        assert_eq!(issued.expires_at, t0() + Duration::seconds(60));
    }

    #[test]
    fn test_sub_second_issue_rounds_expiry_up() {
        let service = service();
        let issued_at = t0() + Duration::milliseconds(900);

        let issued = service
            .issue_at(&alice(), Duration::seconds(60), issued_at)
            .unwrap();

        assert_eq!(issued.expires_at, t0() + Duration::seconds(61));
        assert!(issued.expires_at >= issued_at + Duration::seconds(60));

        let last_valid = issued_at + Duration::milliseconds(59_999);
        assert_eq!(service.validate_at(&issued.token, last_valid), Ok(alice()));
        assert_eq!(
            service.validate_at(&issued.token, t0() + Duration::seconds(61)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let service = service();
        let issued = service
            .issue_at(&alice(), Duration::seconds(60), t0())
            .unwrap();

        let before = service.validate_at(&issued.token, t0() + Duration::seconds(59));
        assert_eq!(before, Ok(alice()));

        let sub_second = t0() + Duration::milliseconds(59_999);
        assert_eq!(service.validate_at(&issued.token, sub_second), Ok(alice()));

        let at = service.validate_at(&issued.token, t0() + Duration::seconds(60));
        assert_eq!(at, Err(TokenError::Expired));

        let after = service.validate_at(&issued.token, t0() + Duration::days(1));
        assert_eq!(after, Err(TokenError::Expired));
    }

    #[test]
    fn test_expired_token_with_real_clock() {
        let service = service();
        let past = Utc::now() - Duration::hours(2);

        let issued = service.issue_at(&alice(), Duration::hours(1), past).unwrap();
        assert_eq!(service.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new("secret1").unwrap();
        let service2 = JwtService::new("secret2").unwrap();

        let issued = service1.issue(&alice(), Duration::hours(1)).unwrap();
        assert_eq!(service2.validate(&issued.token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload() {
        let service = service();
        let issued = service.issue(&alice(), Duration::hours(1)).unwrap();

        let parts: Vec<&str> = issued.token.split('.').collect();
        let forged_claims = serde_json::json!({
            "sub": "2",
            "username": "mallory",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 3600,
        });
        let forged = format!("{}.{}.{}", parts[0], b64(&forged_claims), parts[2]);

        assert_eq!(service.validate(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_other_hmac_algorithms_rejected() {
        let service = service();
        let claims = SessionClaims::new(&alice(), Utc::now(), Duration::hours(1)).unwrap();

        for alg in [Algorithm::HS384, Algorithm::HS512] {
            // Same secret, different algorithm
            let token = encode(
                &Header::new(alg),
                &claims,
                &EncodingKey::from_secret(SECRET.as_bytes()),
            )
            .unwrap();

            assert_eq!(service.validate(&token), Err(TokenError::BadSignature));
        }
    }

    #[test]
    fn test_alg_none_rejected() {
        let service = service();
        let header = serde_json::json!({ "alg": "none", "typ": "JWT" });
        let claims = serde_json::json!({
            "sub": "1",
            "username": "alice",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 3600,
        });

        let unsigned = format!("{}.{}.", b64(&header), b64(&claims));
        assert_eq!(service.validate(&unsigned), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let service = service();

        for token in ["", "invalid.token.here", "not-a-jwt", "a.b"] {
            assert!(
                matches!(service.validate(token), Err(TokenError::Malformed(_))),
                "expected Malformed for {:?}",
                token
            );
        }
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        let service = service();
        let claims = serde_json::json!({ "sub": "1", "username": "alice", "iat": 0 });
        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.validate(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_non_numeric_subject_is_malformed() {
        let service = service();
        let claims = SessionClaims {
            sub: "alice".to_string(),
            username: "alice".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(service.validate(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(JwtService::new(""), Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let service = service();

        assert!(matches!(
            service.issue(&alice(), Duration::zero()),
            Err(TokenError::Signing(_))
        ));
        assert!(matches!(
            service.issue(&alice(), Duration::seconds(-5)),
            Err(TokenError::Signing(_))
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", service());
        assert!(debug.contains("[hidden]"));
        assert!(!debug.contains(SECRET));
    }

    #[test]
    fn test_advertised_algorithm() {
        let header = serde_json::json!({ "alg": "none" });
        let token = format!("{}.e30.", b64(&header));

        assert_eq!(advertised_algorithm(&token), Some("none".to_string()));
        assert_eq!(advertised_algorithm("%%%.e30."), None);
    }
}
