//! The per-request Shopify app helper.
//!
//! [`ShopifyApp`] ties together the app's [`AppConfig`], a [`ShopStore`] and
//! the request's [`ShopSession`]. It resolves the current shop, builds
//! configured API clients and runs GraphQL calls on the shop's behalf.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::shop::{MemoryShopStore, StaticSession};
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, ShopifyApp};
//!
//! # tokio_test::block_on(async {
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let mut app = ShopifyApp::new(config, MemoryShopStore::new(), StaticSession::empty());
//! let shop = app.shop(Some("https://Example.myshopify.com")).await.unwrap().unwrap();
//! assert_eq!(shop.shopify_domain, "example.myshopify.com");
//! # });
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::api::{ApiClient, BasicApi};
use crate::config::AppConfig;
use crate::domain;
use crate::error::{AppError, RequestError};
use crate::hmac::{self, HmacError, HmacOptions, Signature};
use crate::shop::{Shop, ShopSession, ShopStore};

/// Helper for one inbound request.
///
/// The client type `C` is fixed at compile time and defaults to
/// [`BasicApi`]. Use [`with_client`](Self::with_client) to plug in another
/// [`ApiClient`].
///
/// # Shop caching
///
/// The first successful call to [`shop`](Self::shop) caches the resolved
/// shop for the lifetime of the helper. Later calls return the cached shop
/// even when given a different domain; call
/// [`forget_shop`](Self::forget_shop) to resolve again.
pub struct ShopifyApp<St, Se, C = BasicApi> {
    config: AppConfig,
    store: St,
    session: Se,
    shop: Option<Shop>,
    client: PhantomData<fn() -> C>,
}

impl<St, Se> ShopifyApp<St, Se> {
    /// Creates a helper using [`BasicApi`] as its API client.
    #[must_use]
    pub const fn new(config: AppConfig, store: St, session: Se) -> Self {
        Self::with_client(config, store, session)
    }
}

impl<St, Se, C> ShopifyApp<St, Se, C> {
    /// Creates a helper using the client type `C`.
    ///
    /// ```rust
    /// use shopify_app::api::BasicApi;
    /// use shopify_app::shop::{MemoryShopStore, StaticSession};
    /// use shopify_app::{AppConfig, ApiKey, ApiSecretKey, ShopifyApp};
    ///
    /// let config = AppConfig::builder()
    ///     .api_key(ApiKey::new("key").unwrap())
    ///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
    ///     .build()
    ///     .unwrap();
    ///
    /// let app: ShopifyApp<_, _, BasicApi> =
    ///     ShopifyApp::with_client(config, MemoryShopStore::new(), StaticSession::empty());
    /// assert!(app.current_shop().is_none());
    /// ```
    #[must_use]
    pub const fn with_client(config: AppConfig, store: St, session: Se) -> Self {
        Self {
            config,
            store,
            session,
            shop: None,
            client: PhantomData,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the cached shop without resolving one.
    #[must_use]
    pub const fn current_shop(&self) -> Option<&Shop> {
        self.shop.as_ref()
    }

    /// Drops the cached shop so the next [`shop`](Self::shop) call resolves
    /// again. Returns the shop that was cached.
    pub fn forget_shop(&mut self) -> Option<Shop> {
        self.shop.take()
    }

    /// Normalizes a shop domain against the configured suffix.
    ///
    /// See [`domain::sanitize_shop_domain`].
    #[must_use]
    pub fn sanitize_shop_domain(&self, raw: &str) -> Option<String> {
        domain::sanitize_shop_domain(raw, self.config.myshopify_domain())
    }

    /// Signs `options` with the configured API secret, unless the options
    /// carry their own secret.
    ///
    /// # Errors
    ///
    /// Returns [`HmacError`] if the payload does not fit the flags.
    pub fn create_hmac(&self, options: &HmacOptions) -> Result<Signature, HmacError> {
        hmac::create_hmac(options, self.config.api_secret_key())
    }

    /// Logs `message` at debug level when debug mode is on.
    ///
    /// Returns `true` if the message was logged.
    pub fn debug(&self, message: &str) -> bool {
        if !self.config.debug() {
            return false;
        }

        tracing::debug!("{message}");
        true
    }
}

impl<St, Se, C> ShopifyApp<St, Se, C>
where
    St: ShopStore,
    Se: ShopSession,
{
    /// Resolves the current shop.
    ///
    /// A non-empty `domain` is normalized and used; otherwise the session's
    /// domain is used, unless it is empty. When no shop is cached yet and a
    /// domain was found, the store's record for it (soft-deleted ones
    /// included) is fetched or created and cached.
    ///
    /// Returns the cached shop, or `None` if there is neither a cached shop
    /// nor a usable domain.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store fails.
    pub async fn shop(&mut self, domain: Option<&str>) -> Result<Option<&Shop>, AppError> {
        let shopify_domain = match domain.filter(|d| !d.is_empty()) {
            Some(raw) => self.sanitize_shop_domain(raw),
            None => self.session.domain().filter(|d| !d.is_empty()),
        };

        let Some(domain) = shopify_domain else {
            return Ok(self.shop.as_ref());
        };

        if let Some(cached) = &self.shop {
            if cached.shopify_domain != domain {
                tracing::debug!(
                    cached = %cached.shopify_domain,
                    requested = %domain,
                    "Shop already resolved, ignoring requested domain"
                );
            }
        } else {
            let shop = self.store.first_or_create_with_trashed(&domain).await?;
            tracing::debug!(shop = %shop.shopify_domain, id = shop.id, "Resolved current shop");
            self.shop = Some(shop);
        }

        Ok(self.shop.as_ref())
    }
}

impl<St, Se, C> ShopifyApp<St, Se, C>
where
    C: ApiClient + Default,
{
    /// Builds a new API client from the configuration.
    ///
    /// The client gets the API key and secret, plus the API version, rate
    /// limiting, API host and User-Agent prefix when configured. Each call
    /// returns a fresh client.
    #[must_use]
    pub fn api(&self) -> C {
        let mut api = C::default();
        api.set_api_key(self.config.api_key());
        api.set_api_secret(self.config.api_secret_key());

        if let Some(version) = self.config.api_version() {
            api.set_version(*version);
        }
        if let Some(rate_limit) = self.config.rate_limit() {
            api.enable_rate_limiting(*rate_limit);
        }
        if let Some(host) = self.config.api_host() {
            api.set_api_host(host);
        }
        if let Some(prefix) = self.config.user_agent_prefix() {
            api.set_user_agent_prefix(prefix);
        }

        api
    }

    /// Builds an API client bound to `shop` and its access token.
    #[must_use]
    pub fn api_for_shop(&self, shop: &Shop) -> C {
        let mut api = self.api();
        api.set_shop(&shop.shopify_domain);
        api.set_access_token(shop.access_token());
        api
    }

    /// Runs a GraphQL query against the current shop.
    ///
    /// On success the whole response (`data`, `errors`, `extensions`) is
    /// returned as JSON.
    ///
    /// # Errors
    ///
    /// - [`AppError::MissingShop`] if no shop has been resolved
    /// - [`AppError::Api`] if the call fails
    /// - [`AppError::Request`] if the response carries GraphQL errors
    pub async fn request_graphql(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Value, AppError> {
        let shop = self.shop.as_ref().ok_or(AppError::MissingShop)?;
        let response = self.api_for_shop(shop).graph(query, variables).await?;
        let body = serde_json::to_value(&response)?;

        if let Some(error) = graphql_error(&body) {
            tracing::debug!(shop = %shop.shopify_domain, error = %error, "GraphQL request failed");
            return Err(error.into());
        }

        Ok(body)
    }
}

impl<St, Se, C> fmt::Debug for ShopifyApp<St, Se, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyApp")
            .field("config", &self.config)
            .field("shop", &self.shop)
            .finish_non_exhaustive()
    }
}

/// Extracts the error from a GraphQL body whose `errors` is set.
///
/// Lists yield their first entry's `message`, strings are used verbatim and
/// `null` gives an empty message. Any other value is rendered as JSON.
fn graphql_error(body: &Value) -> Option<RequestError> {
    let message = match body.get("errors")? {
        Value::Bool(false) => return None,
        Value::Null => String::new(),
        Value::Array(errors) => errors.first().map_or_else(String::new, |first| {
            match first.get("message") {
                Some(Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => first.to_string(),
            }
        }),
        Value::String(message) => message.clone(),
        other => other.to_string(),
    };
    Some(RequestError::new(message))
}
