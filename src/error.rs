//! Error types for the Shopify app helper.
//!
//! This module contains the configuration error raised while building an
//! [`AppConfig`](crate::AppConfig), the [`RequestError`] raised when a GraphQL
//! response carries errors, and the umbrella [`AppError`] returned by the
//! helper's fallible operations.
//!
//! # Error Handling
//!
//! Configuration constructors return `Result<T, ConfigError>` so that a bad
//! deployment fails at startup instead of on the first request. Nothing in
//! this crate retries or swallows errors; they surface to the immediate
//! caller.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

use crate::api::ApiError;
use crate::shop::StoreError;

/// Errors that can occur while configuring the helper.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2024-01') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// The myshopify domain suffix is unusable.
    #[error("Invalid shop domain suffix '{suffix}'. Expected a bare host suffix such as 'myshopify.com'.")]
    InvalidDomainSuffix {
        /// The suffix that was provided.
        suffix: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://myapp.example.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// An environment variable could not be parsed.
    #[error("Invalid value '{value}' for environment variable {name}.")]
    InvalidEnvVar {
        /// The variable name.
        name: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },
}

/// Error raised when a GraphQL response carries a populated `errors` field.
///
/// The message is the first error's `message` when Shopify returned a list
/// of errors, otherwise the `errors` value itself.
///
/// # Example
///
/// ```rust
/// use shopify_app::RequestError;
///
/// let error = RequestError::new("Throttled");
/// assert_eq!(error.to_string(), "Throttled");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RequestError {
    /// The error message extracted from the response.
    pub message: String,
}

impl RequestError {
    /// Creates a new request error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned by [`ShopifyApp`](crate::ShopifyApp) operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// The GraphQL response contained errors.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The API client failed to complete the call.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The shop store failed to look up or create the shop.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The client's response could not be converted into JSON.
    #[error("Failed to decode GraphQL response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request needed the current shop but none has been resolved.
    #[error("No shop has been resolved for this request. Call shop() with a domain or an active session first.")]
    MissingShop,
}
