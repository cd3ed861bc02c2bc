//! HMAC-SHA256 signing for Shopify request and webhook verification.
//!
//! Shopify signs three kinds of inbound traffic, each with a slightly
//! different canonical form:
//!
//! | Traffic | Payload | Flags |
//! |---|---|---|
//! | Admin / OAuth redirects | sorted query params | `build_query` + `build_query_with_join`, hex |
//! | App proxy requests | sorted query params | `build_query` only, hex |
//! | Webhooks | raw request body | `raw` + `encode` |
//!
//! [`create_hmac`] produces all three from one set of [`HmacOptions`]; the
//! [`verification`](crate::verification) module wires the flags up for each
//! case.
//!
//! # Example
//!
//! ```rust
//! use shopify_app::hmac::{create_hmac, HmacOptions};
//! use shopify_app::ApiSecretKey;
//!
//! let secret = ApiSecretKey::new("key").unwrap();
//! let signature = create_hmac(&HmacOptions::new("message"), &secret).unwrap();
//! assert_eq!(
//!     signature.as_str(),
//!     Some("6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a")
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::ApiSecretKey;

type HmacSha256 = Hmac<Sha256>;

/// A single query parameter value.
///
/// Shopify sends repeated keys (`ids[]=1&ids[]=2`) for list values; these
/// are signed as the values joined with a literal `,`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    /// A scalar value.
    Single(String),
    /// A list value.
    List(Vec<String>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => f.write_str(value),
            Self::List(values) => f.write_str(&values.join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Query parameters keyed and iterated in ascending key order.
pub type QueryParams = BTreeMap<String, ParamValue>;

/// The payload to sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HmacData {
    /// Bytes signed as-is, e.g. a webhook body.
    Message(Vec<u8>),
    /// Key/value pairs that must be compiled with `build_query` first.
    Params(QueryParams),
}

impl From<&str> for HmacData {
    fn from(value: &str) -> Self {
        Self::Message(value.as_bytes().to_vec())
    }
}

impl From<String> for HmacData {
    fn from(value: String) -> Self {
        Self::Message(value.into_bytes())
    }
}

impl From<&[u8]> for HmacData {
    fn from(value: &[u8]) -> Self {
        Self::Message(value.to_vec())
    }
}

impl From<Vec<u8>> for HmacData {
    fn from(value: Vec<u8>) -> Self {
        Self::Message(value)
    }
}

impl From<QueryParams> for HmacData {
    fn from(params: QueryParams) -> Self {
        Self::Params(params)
    }
}

/// Options for a single [`create_hmac`] call.
///
/// All flags default to `false` and the secret defaults to the configured
/// API secret.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacOptions {
    data: HmacData,
    raw: bool,
    build_query: bool,
    build_query_with_join: bool,
    encode: bool,
    secret: Option<String>,
}

impl HmacOptions {
    /// Creates options for signing `data` with every flag off.
    #[must_use]
    pub fn new(data: impl Into<HmacData>) -> Self {
        Self {
            data: data.into(),
            raw: false,
            build_query: false,
            build_query_with_join: false,
            encode: false,
            secret: None,
        }
    }

    /// Keep the digest as raw bytes instead of lower-case hex.
    #[must_use]
    pub const fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// Compile key/value data into a sorted `key=value` string before signing.
    #[must_use]
    pub const fn build_query(mut self, build_query: bool) -> Self {
        self.build_query = build_query;
        self
    }

    /// Separate compiled entries with `&`. Without this, entries are
    /// concatenated with no separator at all.
    #[must_use]
    pub const fn build_query_with_join(mut self, join: bool) -> Self {
        self.build_query_with_join = join;
        self
    }

    /// Base64-encode the result (raw bytes or hex text).
    #[must_use]
    pub const fn encode(mut self, encode: bool) -> Self {
        self.encode = encode;
        self
    }

    /// Sign with this secret instead of the configured API secret.
    #[must_use]
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Returns the payload.
    #[must_use]
    pub const fn data(&self) -> &HmacData {
        &self.data
    }
}

impl fmt::Debug for HmacOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacOptions")
            .field("data", &self.data)
            .field("raw", &self.raw)
            .field("build_query", &self.build_query)
            .field("build_query_with_join", &self.build_query_with_join)
            .field("encode", &self.encode)
            .field("secret", &self.secret.as_ref().map(|_| "*****"))
            .finish()
    }
}

/// A computed signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signature {
    /// Lower-case hex digest.
    Hex(String),
    /// Raw 32-byte digest.
    Raw(Vec<u8>),
    /// Standard (RFC 4648) base64 of either of the above.
    Base64(String),
}

impl Signature {
    /// Returns the signature bytes as they would be sent on the wire.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Hex(s) | Self::Base64(s) => s.as_bytes(),
            Self::Raw(bytes) => bytes,
        }
    }

    /// Returns the textual form, or `None` for a raw digest.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Hex(s) | Self::Base64(s) => Some(s),
            Self::Raw(_) => None,
        }
    }

    /// Compares against a received signature in constant time.
    #[must_use]
    pub fn matches(&self, received: impl AsRef<[u8]>) -> bool {
        constant_time_compare(self.as_bytes(), received.as_ref())
    }
}

/// Errors raised when the payload does not fit the requested flags.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HmacError {
    /// `build_query` was requested for a plain message.
    #[error("build_query requires key/value data, but a plain message was given.")]
    QueryOverMessage,

    /// Key/value data was given without `build_query`.
    #[error("Key/value data must be compiled with build_query before it can be signed.")]
    UncompiledParams,
}

/// Compiles query parameters into the string Shopify signs.
///
/// Entries are sorted by key and rendered as `key=value`; list values are
/// joined with `,`. With `join` the entries are separated by `&`, without it
/// they are concatenated directly (the app proxy format).
///
/// ```rust
/// use shopify_app::hmac::{build_query, QueryParams};
///
/// let mut params = QueryParams::new();
/// params.insert("shop".into(), "a.myshopify.com".into());
/// params.insert("ids".into(), vec!["1", "2"].into());
///
/// assert_eq!(build_query(&params, true), "ids=1,2&shop=a.myshopify.com");
/// assert_eq!(build_query(&params, false), "ids=1,2shop=a.myshopify.com");
/// ```
#[must_use]
pub fn build_query(params: &QueryParams, join: bool) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(if join { "&" } else { "" })
}

/// Computes an HMAC-SHA256 signature according to `options`.
///
/// `default_secret` is used unless the options carry their own secret.
///
/// # Errors
///
/// Returns [`HmacError`] if `build_query` is set for a plain message, or if
/// key/value data is given without `build_query`.
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn create_hmac(
    options: &HmacOptions,
    default_secret: &ApiSecretKey,
) -> Result<Signature, HmacError> {
    let message: Vec<u8> = match (&options.data, options.build_query) {
        (HmacData::Params(params), true) => {
            build_query(params, options.build_query_with_join).into_bytes()
        }
        (HmacData::Message(bytes), false) => bytes.clone(),
        (HmacData::Message(_), true) => return Err(HmacError::QueryOverMessage),
        (HmacData::Params(_), false) => return Err(HmacError::UncompiledParams),
    };

    let secret = options
        .secret
        .as_deref()
        .unwrap_or_else(|| default_secret.as_ref());

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(&message);
    let digest = mac.finalize().into_bytes();

    let signature = if options.raw {
        Signature::Raw(digest.to_vec())
    } else {
        Signature::Hex(hex::encode(digest))
    };

    Ok(if options.encode {
        Signature::Base64(STANDARD.encode(signature.as_bytes()))
    } else {
        signature
    })
}

/// Performs constant-time comparison of two byte strings.
#[must_use]
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    // ConstantTimeEq handles different lengths securely
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> ApiSecretKey {
        ApiSecretKey::new(value).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), ParamValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_hex_signature_matches_known_value() {
        let sig = create_hmac(&HmacOptions::new("message"), &secret("key")).unwrap();
        assert_eq!(
            sig,
            Signature::Hex(
                "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a".to_string()
            )
        );
    }

    #[test]
    fn test_signing_is_deterministic_and_secret_dependent() {
        let default = secret("unused");
        let s1 = create_hmac(&HmacOptions::new("abc").secret("s"), &default).unwrap();
        let s2 = create_hmac(&HmacOptions::new("abc").secret("s"), &default).unwrap();
        let t = create_hmac(&HmacOptions::new("abc").secret("t"), &default).unwrap();

        assert_eq!(s1, s2);
        assert_ne!(s1, t);
    }

    #[test]
    fn test_explicit_secret_overrides_configured_secret() {
        let explicit =
            create_hmac(&HmacOptions::new("abc").secret("s"), &secret("configured")).unwrap();
        let configured = create_hmac(&HmacOptions::new("abc"), &secret("s")).unwrap();
        assert_eq!(explicit, configured);
    }

    #[test]
    fn test_raw_signature_is_32_bytes() {
        let sig = create_hmac(&HmacOptions::new("abc").raw(true), &secret("s")).unwrap();
        assert!(matches!(&sig, Signature::Raw(bytes) if bytes.len() == 32));
        assert_eq!(sig.as_str(), None);
    }

    #[test]
    fn test_raw_encoded_decodes_to_raw_digest() {
        let raw = create_hmac(&HmacOptions::new("abc").raw(true), &secret("s")).unwrap();
        let encoded = create_hmac(
            &HmacOptions::new("abc").raw(true).encode(true),
            &secret("s"),
        )
        .unwrap();

        let text = encoded.as_str().unwrap();
        assert_eq!(text.len(), 44);
        assert_eq!(STANDARD.decode(text).unwrap(), raw.as_bytes());
    }

    #[test]
    fn test_raw_encoded_matches_known_value() {
        let sig = create_hmac(
            &HmacOptions::new(b"message".as_slice()).raw(true).encode(true),
            &secret("key"),
        )
        .unwrap();
        assert_eq!(
            sig.as_str(),
            Some("bp7ym3X//Ft6uuUn1Y/a2y/kLnIZARl2kXNDBl9Y7Uo=")
        );
    }

    #[test]
    fn test_encode_without_raw_encodes_hex_text() {
        let hex_sig = create_hmac(&HmacOptions::new("abc"), &secret("s")).unwrap();
        let encoded = create_hmac(&HmacOptions::new("abc").encode(true), &secret("s")).unwrap();

        let decoded = STANDARD.decode(encoded.as_str().unwrap()).unwrap();
        assert_eq!(decoded, hex_sig.as_bytes());
        assert_eq!(decoded.len(), 64);
    }

    #[test]
    fn test_build_query_sorts_and_joins() {
        let data = params(&[("shop", "x.myshopify.com"), ("code", "abc"), ("timestamp", "1")]);
        assert_eq!(
            build_query(&data, true),
            "code=abc&shop=x.myshopify.com&timestamp=1"
        );
    }

    #[test]
    fn test_build_query_without_join_concatenates_entries() {
        let data = params(&[("b", "2"), ("a", "1")]);
        assert_eq!(build_query(&data, false), "a=1b=2");
    }

    #[test]
    fn test_build_query_joins_list_values_with_comma() {
        let mut data = QueryParams::new();
        data.insert("ids".to_string(), vec!["1", "2", "3"].into());
        assert_eq!(build_query(&data, true), "ids=1,2,3");
    }

    #[test]
    fn test_params_signature_equals_signature_of_compiled_string() {
        let data = params(&[("b", "2"), ("a", "1")]);

        let joined = create_hmac(
            &HmacOptions::new(data.clone())
                .build_query(true)
                .build_query_with_join(true),
            &secret("s"),
        )
        .unwrap();
        let unjoined =
            create_hmac(&HmacOptions::new(data).build_query(true), &secret("s")).unwrap();

        assert_eq!(
            joined,
            create_hmac(&HmacOptions::new("a=1&b=2"), &secret("s")).unwrap()
        );
        assert_eq!(
            unjoined,
            create_hmac(&HmacOptions::new("a=1b=2"), &secret("s")).unwrap()
        );
    }

    #[test]
    fn test_mismatched_payload_and_flags_are_rejected() {
        let result = create_hmac(&HmacOptions::new("a=1").build_query(true), &secret("s"));
        assert_eq!(result, Err(HmacError::QueryOverMessage));

        let result = create_hmac(&HmacOptions::new(params(&[("a", "1")])), &secret("s"));
        assert_eq!(result, Err(HmacError::UncompiledParams));
    }

    #[test]
    fn test_signature_matches_is_exact() {
        let sig = create_hmac(&HmacOptions::new("abc"), &secret("s")).unwrap();
        let text = sig.as_str().unwrap().to_string();

        assert!(sig.matches(&text));
        assert!(!sig.matches(text.to_uppercase()));
        assert!(!sig.matches(""));
    }

    #[test]
    fn test_options_debug_masks_secret() {
        let debug = format!("{:?}", HmacOptions::new("abc").secret("hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("*****"));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"abc123", b"abc123"));
        assert!(constant_time_compare(b"", b""));
        assert!(!constant_time_compare(b"abc", b"abcd"));
        assert!(!constant_time_compare(b"ABC", b"abc"));
    }
}
