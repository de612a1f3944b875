//! Service configuration.
//!
//! Loaded once at startup from an optional TOML file, then overridden by
//! environment variables. Every section has defaults, so the service starts
//! without a file; the default secrets are development values and produce a
//! warning when they end up in the effective configuration.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use satchel_auth::{
    AuthError, AuthScheme, Authenticator, PasswordCost, SharedSecretAuth, TokenAuth, TokenService,
    parse_hmac_algorithm,
};
use satchel_observability::LogSettings;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SATCHEL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "satchel.toml";

pub const DEV_JWT_SECRET: &str = "satchel-dev-jwt-secret";
pub const DEV_SHARED_SECRET: &str = "satchel-dev-shared-secret";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub password: PasswordCost,
    pub storage: StorageConfig,
    pub translator: TranslatorConfig,
    pub cors: CorsConfig,
    pub log: LogSettings,
    /// Path of the file the values were read from, if any.
    #[serde(skip)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// `HS256`, `HS384` or `HS512`.
    pub jwt_algorithm: String,
    pub token_ttl_hours: i64,
    pub shared_secret: String,
    pub shared_secret_header: String,
    /// Gate in front of `/api/products*` and `/api/whoami`.
    pub products_scheme: AuthScheme,
    /// Gate in front of the translation routes.
    pub translate_scheme: AuthScheme,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.into(),
            jwt_algorithm: "HS256".into(),
            token_ttl_hours: satchel_auth::token::DEFAULT_TOKEN_TTL_HOURS,
            shared_secret: DEV_SHARED_SECRET.into(),
            shared_secret_header: satchel_auth::authenticator::DEFAULT_SHARED_SECRET_HEADER.into(),
            products_scheme: AuthScheme::Token,
            translate_scheme: AuthScheme::SharedSecret,
        }
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("shared_secret_header", &self.shared_secret_header)
            .field("products_scheme", &self.products_scheme)
            .field("translate_scheme", &self.translate_scheme)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    pub fn token_service(&self) -> Result<TokenService, AuthError> {
        let algorithm = parse_hmac_algorithm(&self.jwt_algorithm)?;
        let ttl = chrono::Duration::try_hours(self.token_ttl_hours).ok_or_else(|| {
            AuthError::config(format!(
                "auth.token_ttl_hours {} is out of range",
                self.token_ttl_hours
            ))
        })?;
        TokenService::new(self.jwt_secret.as_bytes(), algorithm, ttl)
    }

    pub fn authenticator(&self, scheme: AuthScheme) -> Result<Authenticator, AuthError> {
        match scheme {
            AuthScheme::Token => Ok(Authenticator::Token(TokenAuth::new(self.token_service()?))),
            AuthScheme::SharedSecret => Ok(Authenticator::SharedSecret(SharedSecretAuth::new(
                self.shared_secret_header.as_str(),
                self.shared_secret.as_str(),
            )?)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

impl core::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => anyhow::bail!("unknown storage backend '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

/// Outbound translation backend. An unset endpoint disables translation:
/// every item of a batch then fails individually.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub endpoint: Option<String>,
    pub app_id: String,
    pub secret: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            app_id: String::new(),
            secret: String::new(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl core::fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("endpoint", &self.endpoint)
            .field("app_id", &self.app_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl TranslatorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Empty `origins` allows any origin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub origins: Vec<String>,
}

impl AppConfig {
    /// Load from the file named by `SATCHEL_CONFIG` (or `satchel.toml`),
    /// then apply process environment overrides.
    ///
    /// Runs before logging is set up, so it does not log; see
    /// [`AppConfig::log_startup_warnings`].
    pub fn from_env() -> anyhow::Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_file(&path)?;
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML file. A missing file yields the defaults.
    pub fn load_file(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let mut config = Self::from_toml(&contents)
                    .with_context(|| format!("invalid configuration in '{path}'"))?;
                config.source = Some(path.to_string());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!("config file '{path}' is not readable: {e}")),
        }
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from an environment-like lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = get("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = get("SHARED_SECRET") {
            self.auth.shared_secret = v;
        }
        if let Some(v) = get("STORAGE_BACKEND") {
            self.storage.backend = v.parse()?;
        }
        if let Some(v) = get("DATABASE_URL") {
            self.storage.database_url = Some(v);
        }
        if let Some(v) = get("CORS_ORIGINS") {
            self.cors.origins = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = get("TRANSLATOR_ENDPOINT") {
            self.translator.endpoint = Some(v);
        }
        if let Some(v) = get("TRANSLATOR_APP_ID") {
            self.translator.app_id = v;
        }
        if let Some(v) = get("TRANSLATOR_SECRET") {
            self.translator.secret = v;
        }
        if let Some(v) = get("TRANSLATOR_API_KEY") {
            self.translator.api_key = v;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", self.server.bind_addr))
    }

    /// Log where the configuration came from and flag development secrets.
    /// Call once the subscriber is installed.
    pub fn log_startup_warnings(&self) {
        match &self.source {
            Some(path) => tracing::info!(path = %path, "configuration loaded"),
            None => tracing::warn!("config file not found, using defaults"),
        }
        if self.auth.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET not set, signing tokens with the development secret");
        }
        if self.auth.shared_secret == DEV_SHARED_SECRET {
            tracing::warn!("SHARED_SECRET not set, using the development shared secret");
        }
    }
}
