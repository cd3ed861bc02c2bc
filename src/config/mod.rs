//! Configuration for the Shopify app helper.
//!
//! Configuration is instance-based: build an [`AppConfig`] once at startup and
//! hand it to each [`ShopifyApp`](crate::ShopifyApp). Nothing in this crate
//! reads configuration from global state.
//!
//! # Overview
//!
//! - [`AppConfig`]: all settings the helper consults
//! - [`AppConfigBuilder`]: fluent builder with validation
//! - [`RateLimit`]: client-side throttling policy handed to API clients
//! - [`ApiKey`], [`ApiSecretKey`], [`HostUrl`], [`ApiVersion`]: validated values
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, RateLimit};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .api_version("2025-07".parse().unwrap())
//!     .rate_limit(RateLimit::default())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.myshopify_domain(), "myshopify.com");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl};
pub use version::ApiVersion;

use std::time::Duration;

use crate::error::ConfigError;

/// Default suffix appended to bare shop names.
pub const DEFAULT_MYSHOPIFY_DOMAIN: &str = "myshopify.com";

/// Client-side rate limiting policy.
///
/// An API client honouring this policy waits until `cycle + buffer` has
/// elapsed since its previous call before sending the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Minimum spacing between calls.
    pub cycle: Duration,
    /// Extra safety margin added to every cycle.
    pub buffer: Duration,
}

impl RateLimit {
    /// Creates a policy from millisecond values, the unit used by the
    /// `SHOPIFY_API_RATE_LIMIT_*` settings.
    #[must_use]
    pub const fn from_millis(cycle: u64, buffer: u64) -> Self {
        Self {
            cycle: Duration::from_millis(cycle),
            buffer: Duration::from_millis(buffer),
        }
    }

    /// Total time a client must leave between two calls.
    #[must_use]
    pub fn spacing(&self) -> Duration {
        self.cycle + self.buffer
    }
}

impl Default for RateLimit {
    /// Two calls per second with a 100ms margin.
    fn default() -> Self {
        Self::from_millis(500, 100)
    }
}

/// Configuration for the Shopify app helper.
///
/// `AppConfig` is `Clone + Send + Sync`; share one instance across requests.
#[derive(Clone, Debug)]
pub struct AppConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    api_version: Option<ApiVersion>,
    rate_limit: Option<RateLimit>,
    myshopify_domain: String,
    debug: bool,
    api_host: Option<HostUrl>,
    user_agent_prefix: Option<String>,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Loads configuration from `SHOPIFY_*` environment variables.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `SHOPIFY_API_KEY` | API key (required) |
    /// | `SHOPIFY_API_SECRET` | API secret (required) |
    /// | `SHOPIFY_API_VERSION` | `YYYY-MM` or `unstable` |
    /// | `SHOPIFY_API_RATE_LIMITING_ENABLED` | `true` / `false` |
    /// | `SHOPIFY_API_RATE_LIMIT_CYCLE` | cycle in ms (default 500) |
    /// | `SHOPIFY_API_RATE_LIMIT_CYCLE_BUFFER` | buffer in ms (default 100) |
    /// | `SHOPIFY_MYSHOPIFY_DOMAIN` | shop domain suffix (default `myshopify.com`) |
    /// | `SHOPIFY_DEBUG` | `true` / `false` |
    /// | `SHOPIFY_API_HOST` | optional origin override for API calls |
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// This is [`from_env`](Self::from_env) with the source abstracted, which
    /// lets callers read from a parsed `.env` map or a secrets store.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(key) = lookup("SHOPIFY_API_KEY") {
            builder = builder.api_key(ApiKey::new(key)?);
        }
        if let Some(secret) = lookup("SHOPIFY_API_SECRET") {
            builder = builder.api_secret_key(ApiSecretKey::new(secret)?);
        }
        if let Some(version) = non_empty(lookup("SHOPIFY_API_VERSION")) {
            builder = builder.api_version(version.parse()?);
        }

        if parse_flag(&lookup, "SHOPIFY_API_RATE_LIMITING_ENABLED")? {
            let defaults = RateLimit::default();
            let cycle = parse_millis(&lookup, "SHOPIFY_API_RATE_LIMIT_CYCLE")?
                .unwrap_or(defaults.cycle);
            let buffer = parse_millis(&lookup, "SHOPIFY_API_RATE_LIMIT_CYCLE_BUFFER")?
                .unwrap_or(defaults.buffer);
            builder = builder.rate_limit(RateLimit { cycle, buffer });
        }

        if let Some(domain) = non_empty(lookup("SHOPIFY_MYSHOPIFY_DOMAIN")) {
            builder = builder.myshopify_domain(domain);
        }
        builder = builder.debug(parse_flag(&lookup, "SHOPIFY_DEBUG")?);
        if let Some(host) = non_empty(lookup("SHOPIFY_API_HOST")) {
            builder = builder.api_host(HostUrl::new(host)?);
        }

        builder.build()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the API version, if one is pinned.
    #[must_use]
    pub const fn api_version(&self) -> Option<&ApiVersion> {
        self.api_version.as_ref()
    }

    /// Returns the rate limiting policy, or `None` when rate limiting is off.
    #[must_use]
    pub const fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_ref()
    }

    /// Returns the suffix appended to bare shop names.
    #[must_use]
    pub fn myshopify_domain(&self) -> &str {
        &self.myshopify_domain
    }

    /// Returns whether debug logging is enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Returns the API host override, if configured.
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify AppConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppConfig>();
};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_flag<F>(lookup: &F, name: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let Some(raw) = non_empty(lookup(name)) else {
        return Ok(false);
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar { name, value: raw }),
    }
}

fn parse_millis<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    non_empty(lookup(name))
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidEnvVar { name, value: raw })
        })
        .transpose()
}

/// Builder for constructing [`AppConfig`] instances.
///
/// Required fields are `api_key` and `api_secret_key`.
///
/// # Defaults
///
/// - `api_version`: `None` (the API client keeps its own default)
/// - `rate_limit`: `None` (disabled)
/// - `myshopify_domain`: `myshopify.com`
/// - `debug`: `false`
/// - `api_host`: `None`
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    api_version: Option<ApiVersion>,
    rate_limit: Option<RateLimit>,
    myshopify_domain: Option<String>,
    debug: bool,
    api_host: Option<HostUrl>,
    user_agent_prefix: Option<String>,
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Pins the API version applied to every client.
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Enables client-side rate limiting with the given policy.
    #[must_use]
    pub const fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Sets the suffix appended to bare shop names.
    #[must_use]
    pub fn myshopify_domain(mut self, domain: impl Into<String>) -> Self {
        self.myshopify_domain = Some(domain.into());
        self
    }

    /// Enables or disables debug logging.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Routes API calls to this origin instead of the shop's domain.
    #[must_use]
    pub fn api_host(mut self, host: HostUrl) -> Self {
        self.api_host = Some(host);
        self
    }

    /// Sets the user agent prefix for API requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`AppConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` or
    /// `api_secret_key` is not set, and [`ConfigError::InvalidDomainSuffix`]
    /// if the domain suffix is blank or contains a scheme or path.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        let myshopify_domain = match self.myshopify_domain {
            Some(suffix) => {
                let cleaned = suffix.trim().trim_start_matches('.').to_lowercase();
                if cleaned.is_empty() || cleaned.contains(['/', ':', ' ']) {
                    return Err(ConfigError::InvalidDomainSuffix { suffix });
                }
                cleaned
            }
            None => DEFAULT_MYSHOPIFY_DOMAIN.to_string(),
        };

        Ok(AppConfig {
            api_key,
            api_secret_key,
            api_version: self.api_version,
            rate_limit: self.rate_limit,
            myshopify_domain,
            debug: self.debug,
            api_host: self.api_host,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
