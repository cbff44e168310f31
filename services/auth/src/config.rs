//! Configuration for the login-app
//!
//! All environment reads happen here, once, at process start. The auth
//! service only ever sees the resulting [`AuthConfig`].

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use thiserror::Error;

use crate::password;

/// Secret shipped as the default; never acceptable in production
pub const PLACEHOLDER_SECRET: &str = "your-256-bit-secret-key-here-make-sure-its-long-enough";

/// Default token lifetime: 24 hours
const DEFAULT_TOKEN_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Deployment environment, selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Hash cost used when `HASH_COST` is unset or out of range
    pub fn default_hash_cost(self) -> u32 {
        match self {
            Environment::Development => 1,
            Environment::Production => 4,
        }
    }

    /// Log level used when `LOG_LEVEL` is unset
    pub fn default_log_level(self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "warn",
        }
    }
}

/// Configuration errors; fatal at startup
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The placeholder JWT secret was left in place for production
    #[error("JWT_SECRET must be set in production environment")]
    PlaceholderSecret,

    /// PORT is not a valid TCP port
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),

    /// LOG_FORMAT is neither `text` nor `json`
    #[error("invalid LOG_FORMAT value: {0}")]
    InvalidLogFormat(String),
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

/// Authentication configuration consumed by the auth service
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens
    pub jwt_secret: String,
    /// Lifetime of an issued token
    pub token_duration: Duration,
    /// Argon2 iteration count
    pub hash_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_duration", &self.token_duration)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Config {
    /// Create a new Config from environment variables
    ///
    /// # Environment Variables
    /// - `PORT`: Port to listen on (default: 8080)
    /// - `JWT_SECRET`: Token signing secret (default: a placeholder, rejected in production)
    /// - `HASH_COST`: Argon2 iteration count, ignored when out of range
    /// - `LOG_LEVEL`: Log level
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    ///
    /// Unset `HASH_COST` and `LOG_LEVEL` fall back to the environment's
    /// defaults: cost 1 and `debug` in development, cost 4 and `warn` in
    /// production.
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let port = env_or("PORT", "8080");
        let port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;

        let format = match env_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        let jwt_secret = env_or("JWT_SECRET", PLACEHOLDER_SECRET);
        if environment == Environment::Production && jwt_secret == PLACEHOLDER_SECRET {
            return Err(ConfigError::PlaceholderSecret);
        }

        Ok(Config {
            server: ServerConfig { port },
            auth: AuthConfig {
                jwt_secret,
                token_duration: DEFAULT_TOKEN_DURATION,
                hash_cost: hash_cost_from_env(environment.default_hash_cost()),
            },
            log: LogConfig {
                level: env_or("LOG_LEVEL", environment.default_log_level()),
                format,
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn hash_cost_from_env(default: u32) -> u32 {
    std::env::var("HASH_COST")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|c| (password::MIN_COST..=password::MAX_COST).contains(c))
        .unwrap_or(default)
}
