//! Configuration management for the API server
//!
//! Loaded once at startup from the environment (a `.env` file is honoured in
//! development) and passed down explicitly. Nothing reads the environment
//! after `Config::from_env` returns.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8080)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
//! - `DATABASE_URL`: PostgreSQL connection string; without it the server
//!   runs on the in-memory store
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `JWT_SECRET`: Token signing key, at least 32 characters (required)
//! - `JWT_TTL_HOURS`: Token lifetime, 1 to 8760 (default: 24)
//! - `PASSWORD_MIN_LENGTH`: Minimum password length (default: 8)
//! - `RUST_LOG`: Log filter (default: `taskmgr_api=debug,tower_http=debug`)

use std::env;
use std::str::FromStr;

use taskmgr_shared::auth::jwt::DEFAULT_TTL_HOURS;
use taskmgr_shared::validation::{ValidationConfig, DEFAULT_MIN_PASSWORD_LENGTH};

/// Longest accepted token lifetime (one year)
pub const MAX_TTL_HOURS: i64 = 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub validation: ValidationConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; `None` selects the in-memory store
    pub url: Option<String>,

    pub max_connections: u32,
}

/// Token settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing secret. Generate with `openssl rand -hex 32`.
    pub secret: String,

    pub ttl_hours: i64,
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{name} has an invalid value: {e}")),
        Err(_) => Ok(default),
    }
}

fn checked_ttl(hours: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_TTL_HOURS).contains(&hours) {
        anyhow::bail!("JWT_TTL_HOURS must be between 1 and {MAX_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or short, or a numeric
    /// variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("API_PORT", 8080)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_hours: checked_ttl(parsed("JWT_TTL_HOURS", DEFAULT_TTL_HOURS)?)?,
            },
            validation: ValidationConfig {
                min_password_length: parsed("PASSWORD_MIN_LENGTH", DEFAULT_MIN_PASSWORD_LENGTH)?,
            },
        })
    }

    /// Configuration for tests and local experiments: in-memory store,
    /// permissive CORS and the given signing secret
    pub fn for_testing(secret: &str) -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: secret.to_string(),
                ttl_hours: DEFAULT_TTL_HOURS,
            },
            validation: ValidationConfig::default(),
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_testing("test-secret-key-at-least-32-bytes-long");
        config.api.port = 8080;

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_testing_config_uses_memory_store() {
        let config = Config::for_testing("secret");
        assert!(config.database.url.is_none());
        assert_eq!(config.validation.min_password_length, 8);
    }

    #[test]
    fn test_token_lifetime_is_bounded() {
        assert_eq!(checked_ttl(24).unwrap(), 24);
        assert_eq!(checked_ttl(MAX_TTL_HOURS).unwrap(), MAX_TTL_HOURS);
        assert!(checked_ttl(0).is_err());
        assert!(checked_ttl(-5).is_err());
        assert!(checked_ttl(i64::MAX).is_err());
    }

    #[test]
    fn test_parsed_default_when_unset() {
        let value: u16 = parsed("TASKMGR_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
