//! API client seam and the bundled GraphQL client.
//!
//! The helper builds a fresh client per call through
//! [`ShopifyApp::api`](crate::ShopifyApp::api): it instantiates the client
//! type chosen at compile time, then applies credentials, version and rate
//! limiting from [`AppConfig`](crate::AppConfig). Any type implementing
//! [`ApiClient`] can be plugged in; [`BasicApi`] is the reqwest-backed
//! default.
//!
//! # Response Structure
//!
//! A GraphQL call yields a [`GraphResponse`] with:
//!
//! - `data`: the query result
//! - `errors`: `false` when Shopify reported none, otherwise the raw value
//!   (a list of `{message, ...}` objects or a string)
//! - `extensions`: query cost information, when present

mod basic;
mod errors;

pub use basic::BasicApi;
pub use errors::{ApiError, HttpResponseError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ApiKey, ApiSecretKey, ApiVersion, HostUrl, RateLimit};

/// A Shopify API client the helper can configure and call.
///
/// Setters mirror the configuration the helper applies; `graph` performs the
/// call. Clients are created with [`Default`] and configured afterwards, so
/// the setter methods take `&mut self`.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// The serializable response returned by [`graph`](Self::graph).
    type Response: Serialize + Send;

    /// Sets the app's API key.
    fn set_api_key(&mut self, key: &ApiKey);

    /// Sets the app's API secret.
    fn set_api_secret(&mut self, secret: &ApiSecretKey);

    /// Pins the API version used in request paths.
    fn set_version(&mut self, version: ApiVersion);

    /// Turns on client-side throttling.
    fn enable_rate_limiting(&mut self, rate_limit: RateLimit);

    /// Binds the client to a shop's canonical domain.
    fn set_shop(&mut self, domain: &str);

    /// Sets the shop's access token.
    fn set_access_token(&mut self, token: &str);

    /// Routes requests to another origin. Clients that cannot be redirected
    /// ignore this.
    fn set_api_host(&mut self, _host: &HostUrl) {}

    /// Prefixes the User-Agent header. Ignored by default.
    fn set_user_agent_prefix(&mut self, _prefix: &str) {}

    /// Executes a GraphQL query with optional variables.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the call itself fails. GraphQL-level errors
    /// are part of a successful response.
    async fn graph(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Self::Response, ApiError>;
}

/// A decoded GraphQL response.
///
/// ```rust
/// use shopify_app::api::GraphResponse;
///
/// let response: GraphResponse =
///     serde_json::from_str(r#"{"data":{"shop":{"name":"Example"}}}"#).unwrap();
/// assert!(!response.has_errors());
/// assert_eq!(response.errors, serde_json::Value::Bool(false));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
    /// Query result.
    #[serde(default)]
    pub data: Value,

    /// `false` when there are no errors.
    #[serde(default = "no_errors", deserialize_with = "errors_or_false")]
    pub errors: Value,

    /// Cost and debug information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphResponse {
    /// Returns `true` if Shopify reported GraphQL errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !matches!(self.errors, Value::Bool(false))
    }
}

const fn no_errors() -> Value {
    Value::Bool(false)
}

/// An explicit `null` means the same as an absent field.
fn errors_or_false<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(if value.is_null() { no_errors() } else { value })
}
