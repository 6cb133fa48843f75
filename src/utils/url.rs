// src/utils/url.rs

//! URL manipulation utilities.

use std::sync::LazyLock;

use regex::Regex;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme pattern is valid"));

static TLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.[a-z]{2,}(/|$)").expect("tld pattern is valid"));

/// Normalize user input into a fetchable URL.
///
/// Prefixes `https://` when no http(s) scheme is present and appends `.com`
/// when nothing that looks like a top-level domain is found.
///
/// # Examples
/// ```
/// use geoprobe::utils::url::normalize;
///
/// assert_eq!(normalize("example"), "https://example.com");
/// assert_eq!(normalize("http://a.org/x"), "http://a.org/x");
/// ```
pub fn normalize(input: &str) -> String {
    let mut normalized = input.trim().to_string();

    if !has_scheme(&normalized) {
        normalized = format!("https://{normalized}");
    }

    if !TLD.is_match(&normalized) {
        normalized.push_str(".com");
    }

    normalized
}

/// Whether the URL starts with `http://` or `https://`.
pub fn has_scheme(url: &str) -> bool {
    SCHEME.is_match(url)
}

/// Prefix `https://` when the URL carries no http(s) scheme.
pub fn ensure_scheme(url: &str) -> String {
    let url = url.trim();
    if has_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Build the relay request URL for a target.
///
/// The target is percent-encoded and appended verbatim to the relay base,
/// which is expected to end in a query parameter such as `?url=`.
pub fn relay_url(relay_base: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{relay_base}{encoded}")
}

/// Extract domain from a URL.
pub fn get_domain(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}
