//! Verification of signed requests from Shopify.
//!
//! Each helper builds the canonical payload for one kind of traffic and
//! compares the computed signature with the one Shopify sent, in constant
//! time:
//!
//! - [`verify_request`]: admin loads and OAuth redirects (`hmac` query param)
//! - [`verify_proxy`]: app proxy requests (`signature` query param)
//! - [`verify_webhook`]: webhook bodies (`X-Shopify-Hmac-Sha256` header)
//!
//! # Example
//!
//! ```rust
//! use shopify_app::hmac::{create_hmac, HmacOptions};
//! use shopify_app::verification::{parse_query, verify_request};
//! use shopify_app::{AppConfig, ApiKey, ApiSecretKey};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("hush").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let signed = create_hmac(&HmacOptions::new("shop=a.myshopify.com&timestamp=1"), config.api_secret_key())
//!     .unwrap();
//! let query = format!("shop=a.myshopify.com&timestamp=1&hmac={}", signed.as_str().unwrap());
//!
//! assert!(verify_request(&parse_query(&query), &config));
//! ```

use crate::config::AppConfig;
use crate::hmac::{create_hmac, HmacOptions, ParamValue, QueryParams};

/// Query parameter carrying the admin/OAuth signature.
pub const PARAM_HMAC: &str = "hmac";

/// Query parameter carrying the app proxy signature.
pub const PARAM_SIGNATURE: &str = "signature";

/// HTTP header carrying the webhook signature.
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-Sha256";

/// Verifies an admin or OAuth request signed through its `hmac` parameter.
///
/// The `hmac` and `signature` parameters are excluded, the remaining
/// parameters are sorted and joined with `&`, and the hex HMAC is compared
/// with the received value.
#[must_use]
pub fn verify_request(params: &QueryParams, config: &AppConfig) -> bool {
    let Some(received) = single(params, PARAM_HMAC) else {
        return false;
    };

    let signable = without(params, &[PARAM_HMAC, PARAM_SIGNATURE]);
    let options = HmacOptions::new(signable)
        .build_query(true)
        .build_query_with_join(true);

    create_hmac(&options, config.api_secret_key()).is_ok_and(|sig| sig.matches(received))
}

/// Verifies an app proxy request signed through its `signature` parameter.
///
/// Shopify signs proxy requests with the sorted `key=value` entries
/// concatenated without any separator.
#[must_use]
pub fn verify_proxy(params: &QueryParams, config: &AppConfig) -> bool {
    let Some(received) = single(params, PARAM_SIGNATURE) else {
        return false;
    };

    let signable = without(params, &[PARAM_SIGNATURE]);
    let options = HmacOptions::new(signable).build_query(true);

    create_hmac(&options, config.api_secret_key()).is_ok_and(|sig| sig.matches(received))
}

/// Verifies a webhook body against its `X-Shopify-Hmac-Sha256` header.
///
/// The body must be the exact bytes received, before any JSON parsing.
#[must_use]
pub fn verify_webhook(body: &[u8], hmac_header: &str, config: &AppConfig) -> bool {
    if hmac_header.is_empty() {
        return false;
    }

    let options = HmacOptions::new(body).raw(true).encode(true);
    let verified =
        create_hmac(&options, config.api_secret_key()).is_ok_and(|sig| sig.matches(hmac_header));

    if !verified {
        tracing::warn!("Webhook HMAC verification failed");
    }
    verified
}

/// Parses a raw query string into signable parameters.
///
/// A leading `?` is ignored, `+` decodes to a space and percent escapes are
/// decoded. Keys ending in `[]` always produce list values; other repeated
/// keys are collected into a list in order of appearance.
///
/// ```rust
/// use shopify_app::hmac::ParamValue;
/// use shopify_app::verification::parse_query;
///
/// let params = parse_query("?ids[]=1&ids[]=2&path_prefix=%2Fapps%2Fx");
/// assert_eq!(params["ids"], ParamValue::List(vec!["1".into(), "2".into()]));
/// assert_eq!(params["path_prefix"], ParamValue::Single("/apps/x".into()));
/// ```
#[must_use]
pub fn parse_query(query: &str) -> QueryParams {
    let mut params = QueryParams::new();

    for pair in query.trim_start_matches('?').split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(raw_key);
        let value = decode(raw_value);

        let (key, is_list) = match key.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (key, false),
        };

        match params.remove(&key) {
            None if is_list => {
                params.insert(key, ParamValue::List(vec![value]));
            }
            None => {
                params.insert(key, ParamValue::Single(value));
            }
            Some(ParamValue::Single(first)) => {
                params.insert(key, ParamValue::List(vec![first, value]));
            }
            Some(ParamValue::List(mut values)) => {
                values.push(value);
                params.insert(key, ParamValue::List(values));
            }
        }
    }

    params
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), std::borrow::Cow::into_owned)
}

fn single<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    match params.get(key)? {
        ParamValue::Single(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn without(params: &QueryParams, excluded: &[&str]) -> QueryParams {
    params
        .iter()
        .filter(|(key, _)| !excluded.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};
    use crate::hmac::Signature;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn config(secret: &str) -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new(secret).unwrap())
            .build()
            .unwrap()
    }

    fn sign(message: &str, secret: &str) -> String {
        match create_hmac(
            &HmacOptions::new(message),
            &ApiSecretKey::new(secret).unwrap(),
        )
        .unwrap()
        {
            Signature::Hex(hex) => hex,
            other => panic!("expected hex signature, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_request_accepts_valid_hmac() {
        let hmac = sign(
            "code=abc&shop=a.myshopify.com&state=xyz&timestamp=1700000000",
            "hush",
        );
        let query = format!(
            "shop=a.myshopify.com&code=abc&timestamp=1700000000&state=xyz&hmac={hmac}"
        );

        assert!(verify_request(&parse_query(&query), &config("hush")));
    }

    #[test]
    fn test_verify_request_rejects_tampered_params_and_wrong_secret() {
        let hmac = sign("shop=a.myshopify.com&timestamp=1", "hush");

        let tampered = format!("shop=b.myshopify.com&timestamp=1&hmac={hmac}");
        assert!(!verify_request(&parse_query(&tampered), &config("hush")));

        let original = format!("shop=a.myshopify.com&timestamp=1&hmac={hmac}");
        assert!(!verify_request(&parse_query(&original), &config("other")));
    }

    #[test]
    fn test_verify_request_ignores_signature_param() {
        let hmac = sign("shop=a.myshopify.com&timestamp=1", "hush");
        let query = format!("shop=a.myshopify.com&timestamp=1&signature=zzz&hmac={hmac}");
        assert!(verify_request(&parse_query(&query), &config("hush")));
    }

    #[test]
    fn test_verify_request_without_hmac_is_rejected() {
        let params = parse_query("shop=a.myshopify.com&timestamp=1");
        assert!(!verify_request(&params, &config("hush")));
    }

    #[test]
    fn test_verify_proxy_uses_unjoined_entries() {
        let signature = sign(
            "extra=1,2logged_in_customer_id=path_prefix=/apps/awesome_reviewsshop=a.myshopify.comtimestamp=1317327555",
            "hush",
        );
        let query = format!(
            "extra=1&extra=2&shop=a.myshopify.com&logged_in_customer_id=&path_prefix=%2Fapps%2Fawesome_reviews&timestamp=1317327555&signature={signature}"
        );

        assert!(verify_proxy(&parse_query(&query), &config("hush")));
        assert!(!verify_request(&parse_query(&query), &config("hush")));
    }

    #[test]
    fn test_verify_webhook_accepts_base64_raw_digest() {
        let body = br#"{"id":1,"email":"a@example.com"}"#;
        let raw = create_hmac(
            &HmacOptions::new(body.as_slice()).raw(true),
            &ApiSecretKey::new("hush").unwrap(),
        )
        .unwrap();
        let header = STANDARD.encode(raw.as_bytes());

        assert!(verify_webhook(body, &header, &config("hush")));
        assert!(!verify_webhook(b"{}", &header, &config("hush")));
        assert!(!verify_webhook(body, "", &config("hush")));
    }

    #[test]
    fn test_parse_query_decodes_plus_and_percent() {
        let params = parse_query("q=hello+world&path=%2Fa%2Fb&flag");
        assert_eq!(params["q"], ParamValue::Single("hello world".into()));
        assert_eq!(params["path"], ParamValue::Single("/a/b".into()));
        assert_eq!(params["flag"], ParamValue::Single(String::new()));
    }

    #[test]
    fn test_parse_query_collects_repeated_keys() {
        let params = parse_query("a=1&a=2&a=3&b[]=x");
        assert_eq!(
            params["a"],
            ParamValue::List(vec!["1".into(), "2".into(), "3".into()])
        );
        assert_eq!(params["b"], ParamValue::List(vec!["x".into()]));
    }
}
