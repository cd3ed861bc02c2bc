//! Ambient session seam.

/// Supplies the shop domain tied to the current request, typically read from
/// the framework's session after the merchant authenticated.
pub trait ShopSession: Send + Sync {
    /// Returns the shop domain stored in the session, if any.
    fn domain(&self) -> Option<String>;
}

impl<T: ShopSession + ?Sized> ShopSession for std::sync::Arc<T> {
    fn domain(&self) -> Option<String> {
        (**self).domain()
    }
}

/// A [`ShopSession`] holding a fixed value.
///
/// Useful for background jobs, where there is no browser session, and in
/// tests.
///
/// ```rust
/// use shopify_app::shop::{ShopSession, StaticSession};
///
/// assert_eq!(StaticSession::empty().domain(), None);
/// assert_eq!(
///     StaticSession::new("a.myshopify.com").domain().as_deref(),
///     Some("a.myshopify.com")
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticSession {
    domain: Option<String>,
}

impl StaticSession {
    /// A session carrying `domain`.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
        }
    }

    /// A session with no shop.
    #[must_use]
    pub const fn empty() -> Self {
        Self { domain: None }
    }
}

impl ShopSession for StaticSession {
    fn domain(&self) -> Option<String> {
        self.domain.clone().filter(|d| !d.is_empty())
    }
}
