//! The persisted shop record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One merchant's installation of the app, keyed by canonical domain.
///
/// Shops are owned by the [`ShopStore`](super::ShopStore); the helper only
/// holds a copy of the record it resolved for the current request.
///
/// # Example
///
/// ```rust
/// use shopify_app::Shop;
///
/// let shop = Shop::new(1, "example.myshopify.com").with_token("shpat_123");
///
/// assert!(shop.is_installed());
/// assert!(!shop.is_trashed());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    /// Store-assigned identifier.
    pub id: u64,

    /// Canonical domain, e.g. `example.myshopify.com`.
    pub shopify_domain: String,

    /// Offline access token, once the app has been installed.
    pub shopify_token: Option<String>,

    /// Whether the shop is exempt from billing.
    #[serde(default)]
    pub grandfathered: bool,

    /// Optional tenant namespace.
    #[serde(default)]
    pub namespace: Option<String>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// Soft-delete timestamp; set when the app was uninstalled.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Shop {
    /// Creates a fresh, not yet installed shop record.
    #[must_use]
    pub fn new(id: u64, shopify_domain: impl Into<String>) -> Self {
        Self {
            id,
            shopify_domain: shopify_domain.into(),
            shopify_token: None,
            grandfathered: false,
            namespace: None,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    /// Sets the access token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.shopify_token = Some(token.into());
        self
    }

    /// Returns `true` if the record has been soft-deleted.
    #[must_use]
    pub const fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns `true` if the shop has a token and has not been soft-deleted.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        !self.is_trashed() && self.shopify_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Returns the access token, or an empty string before installation.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.shopify_token.as_deref().unwrap_or_default()
    }
}

// Verify Shop is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Shop>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_shop_is_not_installed() {
        let shop = Shop::new(1, "a.myshopify.com");
        assert!(!shop.is_installed());
        assert_eq!(shop.access_token(), "");
    }

    #[test]
    fn test_trashed_shop_is_not_installed_even_with_token() {
        let mut shop = Shop::new(1, "a.myshopify.com").with_token("token");
        assert!(shop.is_installed());

        shop.deleted_at = Some(Utc::now());
        assert!(shop.is_trashed());
        assert!(!shop.is_installed());
    }

    #[test]
    fn test_empty_token_is_not_installed() {
        let shop = Shop::new(1, "a.myshopify.com").with_token("");
        assert!(!shop.is_installed());
    }

    #[test]
    fn test_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": 7,
            "shopify_domain": "a.myshopify.com",
            "shopify_token": null,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let shop: Shop = serde_json::from_str(json).unwrap();

        assert_eq!(shop.id, 7);
        assert!(!shop.grandfathered);
        assert!(shop.deleted_at.is_none());
    }
}
