//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port (default: `PORT`, then 8080)
//! - `STATIC_DIR` - Directory with the game frontend (default: frontend)
//! - `IDEMPOTENCY_TTL_SECS` - How long checkout responses are replayed (default: 86400)
//! - `CHECKOUT_DEADLINE_SECS` - Upper bound for a whole checkout (default: 30)
//! - `STARTING_BALANCE` - Coins a fresh player starts with (default: 200)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Logging is configured separately by `RUST_LOG` and `LOG_FORMAT` (see `main`).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use snake_shop_core::Coins;
use thiserror::Error;

const DEFAULT_IDEMPOTENCY_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_CHECKOUT_DEADLINE_SECS: u64 = 30;
const DEFAULT_STARTING_BALANCE: u64 = 200;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory served at `/` for the game frontend
    pub static_dir: PathBuf,
    /// Checkout pipeline settings
    pub checkout: CheckoutConfig,
    /// Coins a fresh player starts with
    pub starting_balance: Coins,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Settings for the checkout pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// How long a stored checkout response is replayed for the same key.
    pub idempotency_ttl: Duration,
    /// Deadline for a whole checkout, from request start.
    pub deadline: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            idempotency_ttl: Duration::from_secs(DEFAULT_IDEMPOTENCY_TTL_SECS),
            deadline: Duration::from_secs(DEFAULT_CHECKOUT_DEADLINE_SECS),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            static_dir: PathBuf::from("frontend"),
            checkout: CheckoutConfig::default(),
            starting_balance: Coins::new(DEFAULT_STARTING_BALANCE),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or("SHOP_HOST", "127.0.0.1")?;
        let port = match get_optional_env("SHOP_PORT") {
            Some(_) => parse_env_or("SHOP_PORT", "8080")?,
            None => parse_env_or("PORT", "8080")?,
        };
        let static_dir = PathBuf::from(get_env_or_default("STATIC_DIR", "frontend"));

        let idempotency_ttl = Duration::from_secs(parse_positive_env(
            "IDEMPOTENCY_TTL_SECS",
            DEFAULT_IDEMPOTENCY_TTL_SECS,
        )?);
        let deadline = Duration::from_secs(parse_positive_env(
            "CHECKOUT_DEADLINE_SECS",
            DEFAULT_CHECKOUT_DEADLINE_SECS,
        )?);
        let starting_balance =
            Coins::new(parse_env_or("STARTING_BALANCE", &DEFAULT_STARTING_BALANCE.to_string())?);

        Ok(Self {
            host,
            port,
            static_dir,
            checkout: CheckoutConfig {
                idempotency_ttl,
                deadline,
            },
            starting_balance,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

/// Parse a strictly positive integer, falling back to `default` when unset.
fn parse_positive_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value: u64 = parse_env_or(key, &default.to_string())?;
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
