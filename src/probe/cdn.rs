//! Response header inspection.

use reqwest::header::{HeaderMap, SERVER, VIA};

/// Header values the CDN heuristics look at, lowercased.
#[derive(Debug, Default, Clone)]
pub struct HeaderHints {
    pub server: String,
    pub via: String,
    pub x_cache: String,
}

impl HeaderHints {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_lowercase()
        };
        Self {
            server: get(SERVER.as_str()),
            via: get(VIA.as_str()),
            x_cache: get("x-cache"),
        }
    }
}

/// Guess the CDN in front of a site from its response headers.
pub fn detect_cdn(hints: &HeaderHints) -> Option<&'static str> {
    let HeaderHints {
        server,
        via,
        x_cache,
    } = hints;

    if server.contains("cloudflare") || via.contains("cloudflare") {
        Some("Cloudflare")
    } else if server.contains("akamai") || via.contains("akamai") {
        Some("Akamai")
    } else if x_cache.contains("cloudfront") || server.contains("cloudfront") {
        Some("CloudFront")
    } else if server.contains("fastly") {
        Some("Fastly")
    } else if via.contains("1.1 google") {
        Some("Google CDN")
    } else {
        None
    }
}

/// Map a transport failure to a message a user can act on.
pub fn describe_failure(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "Request timeout - Site may be blocked or slow"
    } else if error.is_connect() {
        "Connection blocked or refused"
    } else if error.is_request() || error.is_body() || error.is_redirect() {
        "Network error - Unable to reach website"
    } else {
        "Unable to access website from this location"
    }
}
