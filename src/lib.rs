//! # Shopify App Helper
//!
//! Request-scoped helper for Shopify apps: resolves the current shop,
//! builds configured Admin API clients, runs GraphQL calls and verifies
//! Shopify's HMAC signatures.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`AppConfig`] and [`AppConfigBuilder`]
//! - Shop domain normalization via [`domain::sanitize_shop_domain`]
//! - HMAC-SHA256 signing via [`hmac::create_hmac`]
//! - Request, app proxy and webhook verification via [`verification`]
//! - Shop resolution through pluggable [`shop::ShopStore`] and
//!   [`shop::ShopSession`] implementations
//! - A reqwest-based GraphQL client, [`api::BasicApi`], behind the
//!   [`api::ApiClient`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_app::shop::{MemoryShopStore, StaticSession};
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey, ApiVersion, ShopifyApp};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .api_version("2025-01".parse::<ApiVersion>().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let app = ShopifyApp::new(config, MemoryShopStore::new(), StaticSession::empty());
//! assert_eq!(
//!     app.sanitize_shop_domain("https://My-Store.myshopify.com/admin").as_deref(),
//!     Some("my-store.myshopify.com")
//! );
//! ```
//!
//! ## Making GraphQL Requests
//!
//! ```rust,ignore
//! use serde_json::json;
//!
//! let mut app = ShopifyApp::new(config, store, session);
//! app.shop(Some(&query_params_shop)).await?;
//!
//! let body = app
//!     .request_graphql(
//!         "query($id: ID!) { product(id: $id) { title } }",
//!         Some(json!({ "id": "gid://shopify/Product/1" })),
//!     )
//!     .await?;
//! println!("{}", body["data"]["product"]["title"]);
//! ```
//!
//! ## Configuration from the Environment
//!
//! [`AppConfig::from_env`] reads `SHOPIFY_API_KEY`, `SHOPIFY_API_SECRET`,
//! `SHOPIFY_API_VERSION`, `SHOPIFY_API_RATE_LIMITING_ENABLED`,
//! `SHOPIFY_API_RATE_LIMIT_CYCLE`, `SHOPIFY_API_RATE_LIMIT_CYCLE_BUFFER`,
//! `SHOPIFY_MYSHOPIFY_DOMAIN`, `SHOPIFY_DEBUG` and `SHOPIFY_API_HOST`.
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **One helper per request**: the resolved shop is cached per instance
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod hmac;
pub mod shop;
pub mod verification;

// Re-export public types at crate root for convenience
pub use app::ShopifyApp;
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, AppConfig, AppConfigBuilder, HostUrl, RateLimit,
};
pub use error::{AppError, ConfigError, RequestError};
pub use shop::Shop;
