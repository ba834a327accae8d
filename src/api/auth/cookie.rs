//! Session cookie formatting

use crate::config::AuthConfig;

/// Attributes of the cookie carrying the session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    max_age_secs: i64,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool, max_age_secs: i64) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age_secs,
        }
    }

    /// Cookie whose lifetime matches the configured token lifetime
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.cookie_name.clone(),
            config.cookie_secure,
            config.token_ttl().num_seconds(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value delivering a token
    pub fn issue(&self, token: &str) -> String {
        self.format(token, self.max_age_secs)
    }

    /// `Set-Cookie` value that makes the browser drop the session
    pub fn clear(&self) -> String {
        self.format("", 0)
    }

    fn format(&self, value: &str, max_age: i64) -> String {
        let secure = if self.secure { " Secure;" } else { "" };
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax;{} Max-Age={}",
            self.name, value, secure, max_age
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_cookie_attributes() {
        let cookie = SessionCookie::new("auth-session", false, 604_800);
        let value = cookie.issue("abc.def.ghi");

        assert_eq!(
            value,
            "auth-session=abc.def.ghi; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800"
        );
    }

    #[test]
    fn test_secure_flag() {
        let cookie = SessionCookie::new("auth-session", true, 60);
        assert!(cookie.issue("t").contains("; Secure;"));
    }

    #[test]
    fn test_clear_cookie() {
        let cookie = SessionCookie::new("auth-session", false, 604_800);
        let value = cookie.clear();

        assert!(value.starts_with("auth-session=;"));
        assert!(value.ends_with("Max-Age=0"));
    }

    #[test]
    fn test_from_config_uses_token_ttl() {
        let config = AuthConfig::default();
        let cookie = SessionCookie::from_config(&config);

        assert_eq!(cookie.name(), "auth-session");
        assert!(cookie.issue("t").ends_with("Max-Age=604800"));
    }
}
