//! Shop domain normalization.
//!
//! Merchants type their store address in every possible shape: `Example`,
//! `https://example.myshopify.com/admin`, ` EXAMPLE.myshopify.com `. The
//! helper stores and looks up shops by a single canonical host, produced by
//! [`sanitize_shop_domain`].

use url::Url;

/// Normalizes a user-supplied shop domain into its canonical host.
///
/// The steps are:
///
/// 1. Trim surrounding whitespace and remove `http://` / `https://`
///    (case-insensitive), then lower-case.
/// 2. If `suffix` does not occur anywhere in the value and the value has no
///    `.`, append `.{suffix}`. A value that already contains a dot is taken
///    to be a full host, even on a custom domain.
/// 3. Parse `https://{value}` as a URL and keep only its host, which drops
///    any path, port, query or credentials.
///
/// Returns `None` for empty input, and for input that cannot be parsed as a
/// host at all.
///
/// # Example
///
/// ```rust
/// use shopify_app::domain::sanitize_shop_domain;
///
/// let suffix = "myshopify.com";
/// assert_eq!(
///     sanitize_shop_domain("HTTPS://Foo.MYSHOPIFY.COM", suffix).as_deref(),
///     Some("foo.myshopify.com")
/// );
/// assert_eq!(
///     sanitize_shop_domain("foo", suffix).as_deref(),
///     Some("foo.myshopify.com")
/// );
/// assert_eq!(
///     sanitize_shop_domain("foo.bar.com", suffix).as_deref(),
///     Some("foo.bar.com")
/// );
/// assert_eq!(sanitize_shop_domain("", suffix), None);
/// ```
#[must_use]
pub fn sanitize_shop_domain(raw: &str, suffix: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut domain = strip_schemes(trimmed).to_lowercase();
    if domain.is_empty() {
        return None;
    }

    if !domain.contains(suffix) && !domain.contains('.') {
        domain.push('.');
        domain.push_str(suffix);
    }

    let url = Url::parse(&format!("https://{domain}")).ok()?;
    url.host_str().filter(|h| !h.is_empty()).map(str::to_string)
}

/// Removes every `http://` and `https://` occurrence, ignoring case.
fn strip_schemes(value: &str) -> String {
    const SCHEMES: [&str; 2] = ["https://", "http://"];

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    'scan: while !rest.is_empty() {
        for scheme in SCHEMES {
            if rest
                .get(..scheme.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
            {
                rest = &rest[scheme.len()..];
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFIX: &str = "myshopify.com";

    fn sanitize(raw: &str) -> Option<String> {
        sanitize_shop_domain(raw, SUFFIX)
    }

    #[test]
    fn test_strips_scheme_and_lowercases() {
        assert_eq!(
            sanitize("HTTPS://Foo.MYSHOPIFY.COM").as_deref(),
            Some("foo.myshopify.com")
        );
        assert_eq!(
            sanitize("http://foo.myshopify.com").as_deref(),
            Some("foo.myshopify.com")
        );
    }

    #[test]
    fn test_appends_suffix_to_bare_shop_name() {
        assert_eq!(sanitize("foo").as_deref(), Some("foo.myshopify.com"));
        assert_eq!(sanitize("  My-Store ").as_deref(), Some("my-store.myshopify.com"));
    }

    #[test]
    fn test_leaves_dotted_custom_domain_alone() {
        assert_eq!(sanitize("foo.bar.com").as_deref(), Some("foo.bar.com"));
    }

    #[test]
    fn test_empty_and_blank_input_yield_none() {
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("   "), None);
        assert_eq!(sanitize("https://"), None);
    }

    #[test]
    fn test_drops_path_port_and_query() {
        assert_eq!(
            sanitize("https://foo.myshopify.com/admin/apps?x=1").as_deref(),
            Some("foo.myshopify.com")
        );
        assert_eq!(
            sanitize("foo.myshopify.com:443").as_deref(),
            Some("foo.myshopify.com")
        );
    }

    #[test]
    fn test_bare_name_with_path_keeps_only_host() {
        // The suffix lands after the path, so host extraction keeps the bare name
        assert_eq!(sanitize("foo/admin").as_deref(), Some("foo"));
    }

    #[test]
    fn test_suffix_already_present_without_dot_prefix() {
        assert_eq!(
            sanitize("foomyshopify.com").as_deref(),
            Some("foomyshopify.com")
        );
    }

    #[test]
    fn test_custom_suffix() {
        assert_eq!(
            sanitize_shop_domain("shop", "myshopify.io").as_deref(),
            Some("shop.myshopify.io")
        );
    }

    #[test]
    fn test_unparseable_host_yields_none() {
        assert_eq!(sanitize("foo bar"), None);
    }

    #[test]
    fn test_strip_schemes_removes_embedded_occurrences() {
        assert_eq!(strip_schemes("hTtPs://a.com"), "a.com");
        assert_eq!(strip_schemes("http://https://a.com"), "a.com");
        assert_eq!(strip_schemes("ä-http://b"), "ä-b");
    }
}
