//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `MEDUSA_BACKEND_URL` - Base URL of the Medusa commerce backend
//! - `MEDUSA_PUBLISHABLE_KEY` - Store API publishable key (sent as `x-publishable-api-key`)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CHECKOUT_SUPPORTED_COUNTRY` - Two-letter country checkout is limited to (default: us)
//! - `CHECKOUT_DEFAULT_PROVIDER` - Manual payment provider id (default: `pp_system_default`)
//! - `CHECKOUT_PAYPAL_PROVIDER` - PayPal wallet provider id (default: `pp_paypal_paypal`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g., production)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate 0.0-1.0 (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

use driftwood_core::CountryCode;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Medusa store API configuration
    pub medusa: MedusaConfig,
    /// Checkout policy configuration
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Medusa store API configuration.
///
/// The publishable key scopes requests to a sales channel and is safe to
/// expose to browsers, so it is kept as a plain string.
#[derive(Debug, Clone)]
pub struct MedusaConfig {
    /// Base URL of the commerce backend (e.g., <https://commerce.example.com>)
    pub backend_url: Url,
    /// Publishable API key sent with every store request
    pub publishable_key: String,
}

/// Checkout policy configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// The single country checkout is allowed to ship to
    pub supported_country: CountryCode,
    /// Provider id used by the manual payment path
    pub default_provider_id: String,
    /// Provider id used by the PayPal wallet path
    pub paypal_provider_id: String,
}

impl StorefrontConfig {
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

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        let medusa = MedusaConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_rate(
            "SENTRY_SAMPLE_RATE",
            &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"),
        )?;
        let sentry_traces_sample_rate = parse_rate(
            "SENTRY_TRACES_SAMPLE_RATE",
            &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1"),
        )?;

        Ok(Self {
            host,
            port,
            base_url,
            medusa,
            checkout,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MedusaConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let backend_url = get_required_env("MEDUSA_BACKEND_URL")?;
        let backend_url = Url::parse(&backend_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MEDUSA_BACKEND_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            backend_url,
            publishable_key: get_required_env("MEDUSA_PUBLISHABLE_KEY")?,
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let supported_country = parse_country(
            "CHECKOUT_SUPPORTED_COUNTRY",
            &get_env_or_default("CHECKOUT_SUPPORTED_COUNTRY", "us"),
        )?;

        Ok(Self {
            supported_country,
            default_provider_id: get_env_or_default(
                "CHECKOUT_DEFAULT_PROVIDER",
                "pp_system_default",
            ),
            paypal_provider_id: get_env_or_default("CHECKOUT_PAYPAL_PROVIDER", "pp_paypal_paypal"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a sample rate value for the given variable name, clamped to 0.0-1.0.
fn parse_rate(key: &str, value: &str) -> Result<f32, ConfigError> {
    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(rate.clamp(0.0, 1.0))
}

/// Parse a country code value for the given variable name.
fn parse_country(key: &str, value: &str) -> Result<CountryCode, ConfigError> {
    CountryCode::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_valid() {
        let rate = parse_rate("TEST_RATE", "0.25").unwrap();
        assert!((rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_rate_clamped() {
        let rate = parse_rate("TEST_RATE", "7.5").unwrap();
        assert!((rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_rate_invalid() {
        let result = parse_rate("TEST_RATE", "not-a-number");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_country_valid() {
        let country = parse_country("TEST_COUNTRY", "US").unwrap();
        assert_eq!(country.as_str(), "us");
    }

    #[test]
    fn test_parse_country_invalid() {
        let result = parse_country("TEST_COUNTRY", "usa");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            medusa: MedusaConfig {
                backend_url: Url::parse("http://localhost:9000").unwrap(),
                publishable_key: "pk_test".to_string(),
            },
            checkout: CheckoutConfig {
                supported_country: CountryCode::parse("us").unwrap(),
                default_provider_id: "pp_system_default".to_string(),
                paypal_provider_id: "pp_paypal_paypal".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
