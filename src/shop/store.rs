//! Shop persistence seam.
//!
//! The helper never talks to a database directly. Host applications implement
//! [`ShopStore`] over their own persistence layer; [`MemoryShopStore`] is a
//! self-contained implementation for tests and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;

use super::Shop;

/// Errors a [`ShopStore`] can report.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed.
    #[error("Shop store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The store refused to create a record for this domain.
    #[error("Shop store rejected domain '{domain}': {reason}")]
    Rejected {
        /// The canonical domain.
        domain: String,
        /// Why the store refused.
        reason: String,
    },
}

/// Get-or-create access to persisted shops.
///
/// Implementations must guarantee at most one record per canonical domain,
/// typically through a uniqueness constraint on the domain column.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Returns the shop with exactly this domain, including soft-deleted
    /// records, creating a new record when none exists.
    async fn first_or_create_with_trashed(&self, domain: &str) -> Result<Shop, StoreError>;
}

#[async_trait]
impl<T: ShopStore + ?Sized> ShopStore for std::sync::Arc<T> {
    async fn first_or_create_with_trashed(&self, domain: &str) -> Result<Shop, StoreError> {
        (**self).first_or_create_with_trashed(domain).await
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    shops: HashMap<String, Shop>,
}

/// In-memory [`ShopStore`] with soft-delete support.
///
/// # Example
///
/// ```rust
/// use shopify_app::shop::{MemoryShopStore, ShopStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryShopStore::new();
/// let first = store.first_or_create_with_trashed("a.myshopify.com").await.unwrap();
/// let again = store.first_or_create_with_trashed("a.myshopify.com").await.unwrap();
/// assert_eq!(first.id, again.id);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryShopStore {
    state: Mutex<MemoryState>,
}

impl MemoryShopStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record, keeping its id.
    pub async fn insert(&self, shop: Shop) {
        let mut state = self.state.lock().await;
        state.next_id = state.next_id.max(shop.id);
        state.shops.insert(shop.shopify_domain.clone(), shop);
    }

    /// Returns the record for `domain`, including soft-deleted records.
    pub async fn get(&self, domain: &str) -> Option<Shop> {
        self.state.lock().await.shops.get(domain).cloned()
    }

    /// Soft-deletes the record for `domain`. Returns `false` if there is no
    /// such record or it was already trashed.
    pub async fn soft_delete(&self, domain: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.shops.get_mut(domain) {
            Some(shop) if shop.deleted_at.is_none() => {
                shop.deleted_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Returns the number of records, trashed ones included.
    pub async fn len(&self) -> usize {
        self.state.lock().await.shops.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ShopStore for MemoryShopStore {
    async fn first_or_create_with_trashed(&self, domain: &str) -> Result<Shop, StoreError> {
        if domain.is_empty() {
            return Err(StoreError::Rejected {
                domain: domain.to_string(),
                reason: "domain is empty".to_string(),
            });
        }

        let mut state = self.state.lock().await;
        if let Some(shop) = state.shops.get(domain) {
            return Ok(shop.clone());
        }

        state.next_id += 1;
        let shop = Shop::new(state.next_id, domain);
        tracing::debug!(shop = %domain, id = shop.id, "Created shop record");
        state.shops.insert(domain.to_string(), shop.clone());
        Ok(shop)
    }
}
