use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;

/// Unprefixed variables honored when the `APP__*` equivalent is not set
const LEGACY_ENV_FALLBACKS: [(&str, &str); 3] = [
    ("server.port", "PORT"),
    ("auth.jwt_secret", "JWT_SECRET"),
    ("storage.database_url", "DATABASE_URL"),
];

/// Ten years
const MAX_TOKEN_TTL_HOURS: u64 = 24 * 365 * 10;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Session token and password hashing settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret; the server refuses to start without one
    pub jwt_secret: Option<String>,
    /// Session token lifetime
    pub token_ttl_hours: u64,
    /// Name of the cookie carrying the session token
    pub cookie_name: String,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Argon2 memory cost in KiB
    pub hash_memory_kib: u32,
    /// Argon2 iteration count
    pub hash_iterations: u32,
    /// Argon2 lanes
    pub hash_parallelism: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Cross-origin policy
///
/// An empty origin list allows any origin without credentials. Explicit origins
/// are allowed with credentials so the session cookie is sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: 168,
            cookie_name: "auth-session".to_string(),
            cookie_secure: false,
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
            hash_parallelism: 1,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 25,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 300,
        }
    }
}

impl AuthConfig {
    /// The configured signing secret
    pub fn jwt_secret(&self) -> Result<&str, ConfigError> {
        match self.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(ConfigError::Message(
                "auth.jwt_secret is required (set APP__AUTH__JWT_SECRET or JWT_SECRET)"
                    .to_string(),
            )),
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours as i64)
    }
}

impl StorageConfig {
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        match self.database_url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ConfigError::Message(
                "storage.database_url is required for the postgres backend \
                 (set APP__STORAGE__DATABASE_URL or DATABASE_URL)"
                    .to_string(),
            )),
        }
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local`, `APP__*` variables and the
    /// legacy unprefixed variables, in increasing precedence except for the legacy
    /// ones which only fill gaps
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        for (key, var) in LEGACY_ENV_FALLBACKS {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_default(key, value)?;
            }
        }

        let builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            );

        Self::from_builder(builder)
    }

    /// Build and validate a configuration from prepared sources
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde defaults cannot express
    ///
    /// The signing secret is not checked here so that commands which never issue
    /// tokens (migrations) can run without it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_ttl_hours == 0 || self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ConfigError::Message(format!(
                "auth.token_ttl_hours must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }

        if self.auth.cookie_name.is_empty() {
            return Err(ConfigError::Message(
                "auth.cookie_name cannot be empty".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Postgres {
            self.storage.database_url()?;
        }

        Ok(())
    }
}
