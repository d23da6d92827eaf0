//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use qcall_admin::db::DatabaseConfig;
use qcall_admin::session::{DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS};
use std::net::SocketAddr;

const DEFAULT_BIND: ([u8; 4], u16) = ([127, 0, 0, 1], 8000);
const DEFAULT_DB_NAME: &str = "qcall_db";
const DEFAULT_APP_URL: &str = "http://localhost:8000";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const MIN_JWT_SECRET_LEN: usize = 16;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Lifetime of a server-side session entry
    pub session_ttl_secs: u64,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Public base URL of the panel, used as the token issuer and CORS origin
    pub app_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `db_uri_override` - Optional MongoDB URI override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        db_uri_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), bind_override, db_uri_override)
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(
        lookup: F,
        bind_override: Option<SocketAddr>,
        db_uri_override: Option<String>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_or(&lookup, "SERVER_BIND", SocketAddr::from(DEFAULT_BIND))?,
        };

        // Database configuration
        let uri = db_uri_override
            .or_else(|| lookup("DB_URI"))
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "DB_URI".to_string(),
                hint: "e.g. mongodb://localhost:27017".to_string(),
            })?;

        let database = DatabaseConfig {
            uri,
            database_name: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            connect_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };

        // Security configuration (REQUIRED)
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let security = SecurityConfig {
            jwt_secret,
            app_url: lookup("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
        };

        let config = ServerConfig {
            bind,
            database,
            security,
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_JWT_SECRET_LEN} characters"),
            });
        }

        if self.database.database_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "DB_NAME".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.database.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_CONNECT_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.session_ttl_secs == 0 || self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::Invalid {
                var: "SESSION_TTL_SECS".to_string(),
                reason: format!("Must be between 1 and {MAX_SESSION_TTL_SECS}"),
            });
        }

        if !self.security.app_url.starts_with("http://")
            && !self.security.app_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                var: "APP_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional variable, falling back to `default` when it is unset
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse {raw:?}"),
        }),
        None => Ok(default),
    }
}
