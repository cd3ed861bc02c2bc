//! Reqwest-backed GraphQL client for the Shopify Admin API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{ApiClient, ApiError, GraphResponse, HttpResponseError};
use crate::config::{ApiKey, ApiSecretKey, ApiVersion, HostUrl, RateLimit};

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default GraphQL client used by [`ShopifyApp`](crate::ShopifyApp).
///
/// Requests go to `https://{shop}/admin/api/{version}/graphql.json`, or to
/// the unversioned `/admin/api/graphql.json` when no version is pinned.
/// With an API host override the shop's domain is replaced by that origin.
///
/// # Rate Limiting
///
/// When rate limiting is enabled, each call waits until `cycle + buffer` has
/// passed since the previous call made through the same client.
///
/// # Credentials
///
/// The app's API key and secret are not sent with GraphQL calls, which only
/// need the shop's access token. They are kept so callers holding a client
/// from [`ShopifyApp::api`](crate::ShopifyApp::api) can read them back, e.g.
/// to sign or verify payloads on the shop's behalf.
///
/// # Thread Safety
///
/// `BasicApi` is `Send + Sync`; concurrent calls on one client are spaced
/// out by the rate limiter.
#[derive(Debug)]
pub struct BasicApi {
    client: reqwest::Client,
    api_key: Option<ApiKey>,
    api_secret: Option<ApiSecretKey>,
    version: Option<ApiVersion>,
    rate_limit: Option<RateLimit>,
    shop: Option<String>,
    access_token: Option<String>,
    api_host: Option<HostUrl>,
    user_agent_prefix: Option<String>,
    last_call: Mutex<Option<Instant>>,
}

// Verify BasicApi is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BasicApi>();
};

impl Default for BasicApi {
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: None,
            api_secret: None,
            version: None,
            rate_limit: None,
            shop: None,
            access_token: None,
            api_host: None,
            user_agent_prefix: None,
            last_call: Mutex::new(None),
        }
    }
}

impl BasicApi {
    /// Returns the API key, if set.
    #[must_use]
    pub const fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// Returns the API secret, if set.
    #[must_use]
    pub const fn api_secret(&self) -> Option<&ApiSecretKey> {
        self.api_secret.as_ref()
    }

    /// Returns the pinned API version, if any.
    #[must_use]
    pub const fn version(&self) -> Option<&ApiVersion> {
        self.version.as_ref()
    }

    /// Returns the rate limiting policy, if enabled.
    #[must_use]
    pub const fn rate_limit(&self) -> Option<&RateLimit> {
        self.rate_limit.as_ref()
    }

    /// Returns the bound shop domain, if set.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.shop.as_deref()
    }

    /// Returns the GraphQL endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] if no shop is bound and no API
    /// host override is set.
    pub fn graphql_url(&self) -> Result<String, ApiError> {
        let base = match (&self.api_host, &self.shop) {
            (Some(host), _) => host.origin(),
            (None, Some(shop)) => format!("https://{shop}"),
            (None, None) => return Err(ApiError::NotConfigured { field: "shop" }),
        };
        Ok(match &self.version {
            Some(version) => format!("{base}/admin/api/{version}/graphql.json"),
            None => format!("{base}/admin/api/graphql.json"),
        })
    }

    fn user_agent(&self) -> String {
        let prefix = self
            .user_agent_prefix
            .as_deref()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        format!("{prefix}Shopify App Helper v{SDK_VERSION} | Rust")
    }

    /// Sleeps until the configured spacing since the previous call has passed.
    async fn throttle(&self) {
        let Some(rate_limit) = self.rate_limit else {
            return;
        };

        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let wait = rate_limit.spacing().saturating_sub(previous.elapsed());
            if wait > Duration::ZERO {
                tracing::debug!(?wait, "Rate limiting GraphQL call");
                tokio::time::sleep(wait).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

#[async_trait]
impl ApiClient for BasicApi {
    type Response = GraphResponse;

    fn set_api_key(&mut self, key: &ApiKey) {
        self.api_key = Some(key.clone());
    }

    fn set_api_secret(&mut self, secret: &ApiSecretKey) {
        self.api_secret = Some(secret.clone());
    }

    fn set_version(&mut self, version: ApiVersion) {
        self.version = Some(version);
    }

    fn enable_rate_limiting(&mut self, rate_limit: RateLimit) {
        self.rate_limit = Some(rate_limit);
    }

    fn set_shop(&mut self, domain: &str) {
        self.shop = Some(domain.to_string());
    }

    fn set_access_token(&mut self, token: &str) {
        self.access_token = Some(token.to_string());
    }

    fn set_api_host(&mut self, host: &HostUrl) {
        self.api_host = Some(host.clone());
    }

    fn set_user_agent_prefix(&mut self, prefix: &str) {
        self.user_agent_prefix = Some(prefix.to_string());
    }

    async fn graph(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<GraphResponse, ApiError> {
        let url = self.graphql_url()?;
        let body = serde_json::json!({
            "query": query,
            "variables": variables
        });

        self.throttle().await;

        let mut request = self
            .client
            .post(&url)
            .header("User-Agent", self.user_agent())
            .header("Accept", "application/json")
            .json(&body);

        if let Some(token) = self.access_token.as_deref().filter(|t| !t.is_empty()) {
            request = request.header("X-Shopify-Access-Token", token);
        }
        // Proxies need to know which shop the call is for
        if let (Some(_), Some(shop)) = (&self.api_host, &self.shop) {
            request = request.header("X-Shopify-Shop-Domain", shop.as_str());
        }

        let response = request.send().await?;
        let code = response.status().as_u16();
        let error_reference = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let text = response.text().await?;

        if !(200..300).contains(&code) {
            return Err(HttpResponseError {
                code,
                message: text,
                error_reference,
            }
            .into());
        }

        serde_json::from_str(&text).map_err(|e| ApiError::InvalidBody {
            reason: e.to_string(),
        })
    }
}
