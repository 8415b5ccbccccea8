//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `NG_STORE_API_URL` - Base URL of the catalog API (e.g., `http://localhost:3000`)
//! - `NG_STORE_DOMAIN` - Public URL of the storefront, used as the default `og:url`
//!
//! ## Optional
//! - `NG_STORE_TRANSPORT` - `stream` or `fetch` (default: stream)
//! - `NG_STORE_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `NG_STORE_CACHE_TTL_SECS` - Response cache TTL in seconds, 0 disables (default: 0)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::catalog::TransportKind;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the catalog API
    pub api_url: Url,
    /// Public URL of the storefront
    pub domain: String,
    /// Transport backing the catalog gateway
    pub transport: TransportKind,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Response cache TTL; `None` disables caching
    pub cache_ttl: Option<Duration>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl StoreConfig {
    /// Configuration with defaults for everything but the two URLs.
    #[must_use]
    pub fn new(api_url: Url, domain: impl Into<String>) -> Self {
        Self {
            api_url,
            domain: domain.into(),
            transport: TransportKind::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cache_ttl: None,
            sentry_dsn: None,
        }
    }

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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let api_url = env.required("NG_STORE_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("NG_STORE_API_URL".to_string(), e.to_string()))?;

        let domain = env.required("NG_STORE_DOMAIN")?;

        let transport = env
            .or_default("NG_STORE_TRANSPORT", "stream")
            .parse::<TransportKind>()
            .map_err(|e| ConfigError::InvalidEnvVar("NG_STORE_TRANSPORT".to_string(), e))?;

        let http_timeout = env.seconds("NG_STORE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if http_timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar(
                "NG_STORE_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        let cache_ttl = Some(env.seconds("NG_STORE_CACHE_TTL_SECS", 0)?).filter(|ttl| !ttl.is_zero());

        Ok(Self {
            api_url,
            domain: domain.trim_end_matches('/').to_string(),
            transport,
            http_timeout,
            cache_ttl,
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a whole number of seconds.
    fn seconds(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        self.optional(key).map_or(Ok(Duration::from_secs(default)), |value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StoreConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("NG_STORE_API_URL", "http://localhost:3000"),
        ("NG_STORE_DOMAIN", "https://ng-store.example/"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.domain, "https://ng-store.example");
        assert_eq!(config.transport, TransportKind::Stream);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.cache_ttl.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[("NG_STORE_DOMAIN", "https://ng-store.example")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "NG_STORE_API_URL"));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = load(&[
            ("NG_STORE_API_URL", "http://localhost:3000"),
            ("NG_STORE_DOMAIN", "  "),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "NG_STORE_DOMAIN"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = load(&[
            ("NG_STORE_API_URL", "not a url"),
            ("NG_STORE_DOMAIN", "https://ng-store.example"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "NG_STORE_API_URL"));
    }

    #[test]
    fn test_optional_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("NG_STORE_TRANSPORT", "fetch"),
            ("NG_STORE_HTTP_TIMEOUT_SECS", "5"),
            ("NG_STORE_CACHE_TTL_SECS", "120"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
        ]);

        let config = load(&vars).unwrap();

        assert_eq!(config.transport, TransportKind::Fetch);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(120)));
        assert_eq!(config.sentry_dsn.as_deref(), Some("https://key@sentry.example/1"));
    }

    #[test]
    fn test_zero_cache_ttl_disables_cache() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("NG_STORE_CACHE_TTL_SECS", "0"));

        assert!(load(&vars).unwrap().cache_ttl.is_none());
    }

    #[test]
    fn test_invalid_numbers() {
        for (key, value) in [
            ("NG_STORE_HTTP_TIMEOUT_SECS", "soon"),
            ("NG_STORE_HTTP_TIMEOUT_SECS", "0"),
            ("NG_STORE_CACHE_TTL_SECS", "-1"),
            ("NG_STORE_TRANSPORT", "carrier-pigeon"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((key, value));
            let err = load(&vars).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == key),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("NG_STORE_API_URL".to_string());
        assert_eq!(err.to_string(), "Missing environment variable: NG_STORE_API_URL");
    }
}
