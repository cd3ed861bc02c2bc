//! Error types for API clients.

use thiserror::Error;

/// Error returned when the Admin API answers with a non-2xx status.
///
/// ```rust
/// use shopify_app::api::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 401,
///     message: r#"{"errors":"[API] Invalid API key or access token"}"#.to_string(),
///     error_reference: Some("abc-123".to_string()),
/// };
/// assert!(error.to_string().contains("401"));
/// ```
#[derive(Debug, Error)]
#[error("Shopify responded with status {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code.
    pub code: u16,
    /// The response body, verbatim.
    pub message: String,
    /// The `X-Request-Id` header, for support tickets.
    pub error_reference: Option<String>,
}

/// Errors raised by an [`ApiClient`](super::ApiClient) while performing a call.
///
/// GraphQL-level errors arrive with status 200 inside the response body and
/// are not represented here; the helper turns those into a
/// [`RequestError`](crate::RequestError).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The client was used before a required setting was applied.
    #[error("API client is missing its {field}. Use ShopifyApp::api_for_shop to build a client bound to a shop.")]
    NotConfigured {
        /// The missing setting.
        field: &'static str,
    },

    /// The response body was not a GraphQL JSON document.
    #[error("Invalid GraphQL response body: {reason}")]
    InvalidBody {
        /// What was wrong with the body.
        reason: String,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
