//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ROCKETSHOES_API_URL` - Catalog/stock API base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_CART_KEY` - Storage key of the persisted cart (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_STORAGE_PATH` - JSON file backing the key-value store (default: in-memory)
//! - `ROCKETSHOES_CURRENCY` - Currency used when rendering cart views (default: USD)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product metadata cache TTL, 0 disables (default: 300)
//! - `ROCKETSHOES_HTTP_TIMEOUT_SECS` - Catalog request timeout, at least 1 (default: none)
//! - `ROCKETSHOES_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::path::PathBuf;
use std::time::Duration;

use rocketshoes_core::CurrencyCode;
use thiserror::Error;
use url::Url;

use crate::store::DEFAULT_CART_KEY;
use crate::telemetry::LogFormat;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_PRODUCT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog/stock API configuration
    pub catalog: CatalogConfig,
    /// Key under which the cart blob is stored
    pub storage_key: String,
    /// JSON file backing the key-value store; `None` keeps the cart in memory
    pub storage_path: Option<PathBuf>,
    /// Currency used for cart views
    pub currency: CurrencyCode,
    /// Log output format
    pub log_format: LogFormat,
}

/// Catalog/stock API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; always ends with `/` so resource paths join below it
    pub base_url: Url,
    /// Product metadata cache TTL; zero disables the cache
    pub product_cache_ttl: Duration,
    /// Maximum number of cached products
    pub product_cache_capacity: u64,
    /// Per-request timeout
    pub request_timeout: Option<Duration>,
}

impl CatalogConfig {
    /// Configuration for a base URL with default cache settings and no timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("ROCKETSHOES_API_URL", base_url)?,
            product_cache_ttl: Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS),
            product_cache_capacity: DEFAULT_PRODUCT_CACHE_CAPACITY,
            request_timeout: None,
        })
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let base_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &get_or_default("ROCKETSHOES_API_URL", DEFAULT_API_URL),
        )?;
        let product_cache_ttl = Duration::from_secs(parse_var(
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            &get_or_default(
                "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
                &DEFAULT_PRODUCT_CACHE_TTL_SECS.to_string(),
            ),
        )?);
        let request_timeout = lookup("ROCKETSHOES_HTTP_TIMEOUT_SECS")
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_timeout("ROCKETSHOES_HTTP_TIMEOUT_SECS", &v))
            .transpose()?;

        let catalog = CatalogConfig {
            base_url,
            product_cache_ttl,
            product_cache_capacity: DEFAULT_PRODUCT_CACHE_CAPACITY,
            request_timeout,
        };

        let storage_key = get_or_default("ROCKETSHOES_CART_KEY", DEFAULT_CART_KEY);
        let storage_path = lookup("ROCKETSHOES_STORAGE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let currency = parse_var(
            "ROCKETSHOES_CURRENCY",
            &get_or_default("ROCKETSHOES_CURRENCY", "USD"),
        )?;
        let log_format = parse_var(
            "ROCKETSHOES_LOG_FORMAT",
            &get_or_default("ROCKETSHOES_LOG_FORMAT", "pretty"),
        )?;

        Ok(Self {
            catalog,
            storage_key,
            storage_path,
            currency,
            log_format,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable value, reporting the variable name on failure.
fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a timeout in whole seconds; zero would fail every request.
fn parse_timeout(key: &str, value: &str) -> Result<Duration, ConfigError> {
    match parse_var::<u64>(key, value)? {
        0 => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "timeout must be at least 1 second".to_string(),
        )),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Parse an http(s) base URL and make sure its path ends with `/`.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
