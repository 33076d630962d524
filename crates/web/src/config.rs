//! Web server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STACKFOOD_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STACKFOOD_BASE_URL` - Public URL of the site
//!
//! ## Optional
//! - `STACKFOOD_HOST` - Bind address (default: 127.0.0.1)
//! - `STACKFOOD_PORT` - Listen port (default: 3000)
//! - `STACKFOOD_RATE_LIMIT` - Rate limit auth form submissions per IP (default: true)
//! - `STACKFOOD_TRUSTED_PROXY` - Take the client IP from proxy headers such as
//!   `X-Forwarded-For` (default: false; enable only behind a proxy that sets them)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (e.g. production)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: Url,
    /// Whether auth form submissions are rate limited per client IP
    pub rate_limit: bool,
    /// Whether client IP headers come from a trusted reverse proxy
    pub trusted_proxy: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced by Sentry
    pub sentry_traces_sample_rate: f32,
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STACKFOOD_DATABASE_URL")?;
        let host = parse_env("STACKFOOD_HOST", "127.0.0.1")?;
        let port = parse_env("STACKFOOD_PORT", "3000")?;
        let base_url = parse_base_url(&get_required_env("STACKFOOD_BASE_URL")?)?;
        let rate_limit = parse_env("STACKFOOD_RATE_LIMIT", "true")?;
        let trusted_proxy = parse_env("STACKFOOD_TRUSTED_PROXY", "false")?;

        let sentry_sample_rate = parse_sample_rate("SENTRY_SAMPLE_RATE", "1.0")?;
        let sentry_traces_sample_rate = parse_sample_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            rate_limit,
            trusted_proxy,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS (controls the `Secure` cookie flag).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

/// Load only the database URL, for tools that talk to the database without
/// serving HTTP.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if neither `STACKFOOD_DATABASE_URL`
/// nor `DATABASE_URL` is set.
pub fn database_url_from_env() -> Result<SecretString, ConfigError> {
    let _ = dotenvy::dotenv();
    get_database_url("STACKFOOD_DATABASE_URL")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_sample_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

/// Parse the public base URL; only `http` and `https` are accepted.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| {
        ConfigError::InvalidEnvVar("STACKFOOD_BASE_URL".to_string(), e.to_string())
    })?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ConfigError::InvalidEnvVar(
            "STACKFOOD_BASE_URL".to_string(),
            "must be an http(s) URL with a host".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> WebConfig {
        WebConfig {
            database_url: SecretString::from("postgres://localhost/stackfood_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: Url::parse(base_url).unwrap(),
            rate_limit: false,
            trusted_proxy: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!test_config("http://localhost:3000").is_secure());
        assert!(test_config("https://stackfood.cm").is_secure());
    }

    #[test]
    fn test_parse_base_url_accepts_http_and_https() {
        assert!(parse_base_url("http://localhost:3000").is_ok());
        assert!(parse_base_url("https://stackfood.cm").is_ok());
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(matches!(
            parse_base_url("ftp://stackfood.cm"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_env_uses_default() {
        let port: u16 = parse_env("STACKFOOD_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_env_reports_key_on_error() {
        let err = parse_env::<u16>("STACKFOOD_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("STACKFOOD_TEST_UNSET_PORT"));
    }

    #[test]
    fn test_parse_sample_rate_range() {
        assert!(parse_sample_rate("STACKFOOD_TEST_UNSET_RATE", "0.5").is_ok());
        assert!(parse_sample_rate("STACKFOOD_TEST_UNSET_RATE", "1.5").is_err());
        assert!(parse_sample_rate("STACKFOOD_TEST_UNSET_RATE", "-0.1").is_err());
    }
}
