//! Probe result data structures.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Country;

/// Outcome class of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Accessible,
    Blocked,
    Error,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Accessible => "accessible",
            ProbeStatus::Blocked => "blocked",
            ProbeStatus::Error => "error",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of probing one URL from one country.
///
/// Built through [`ProbeResult::accessible`], [`ProbeResult::blocked`] or
/// [`ProbeResult::error`] so that an accessible result never carries an
/// error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// Country the probe ran for
    pub country: Country,

    pub status: ProbeStatus,

    /// Elapsed time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_time: Option<u64>,

    /// HTTP-like status code (0 on transport failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// CDN label, `None` when no CDN was detected
    pub cdn: Option<String>,

    pub vpn_detected: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl ProbeResult {
    /// A reachable target.
    pub fn accessible(
        country: Country,
        http_status: u16,
        load_time: u64,
        server: impl Into<String>,
        cdn: Option<String>,
        vpn_detected: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            country,
            status: ProbeStatus::Accessible,
            load_time: Some(load_time),
            http_status: Some(http_status),
            server: Some(server.into()),
            cdn,
            vpn_detected,
            error: None,
            timestamp,
        }
    }

    /// A target that answered, or failed at transport level, in a way that
    /// counts as blocked.
    pub fn blocked(
        country: Country,
        http_status: u16,
        load_time: u64,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            country,
            status: ProbeStatus::Blocked,
            load_time: Some(load_time),
            http_status: Some(http_status),
            server: None,
            cdn: None,
            vpn_detected: false,
            error,
            timestamp,
        }
    }

    /// A probe that faulted before producing a measurement.
    pub fn error(country: Country, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            country,
            status: ProbeStatus::Error,
            load_time: None,
            http_status: None,
            server: None,
            cdn: None,
            vpn_detected: false,
            error: Some(message.into()),
            timestamp,
        }
    }

    /// Attach the response metadata a relay returned alongside a blocking
    /// status.
    pub fn with_response_meta(mut self, server: Option<String>, cdn: Option<String>) -> Self {
        if self.status != ProbeStatus::Accessible {
            self.server = server;
            self.cdn = cdn;
        }
        self
    }

    pub fn is_accessible(&self) -> bool {
        self.status == ProbeStatus::Accessible
    }

    /// Whether the fields agree with the status.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            ProbeStatus::Accessible => {
                self.error.is_none() && self.http_status.is_some() && self.load_time.is_some()
            }
            ProbeStatus::Blocked => self.http_status.is_some(),
            ProbeStatus::Error => self.error.as_deref().is_some_and(|e| !e.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn us() -> Country {
        *Country::find("US").expect("US in catalog")
    }

    #[test]
    fn test_constructors_are_consistent() {
        let now = Utc::now();
        let ok = ProbeResult::accessible(us(), 200, 512, "nginx", None, false, now);
        let blocked = ProbeResult::blocked(us(), 403, 120, Some("nope".into()), now);
        let failed = ProbeResult::error(us(), "Test failed", now);

        assert!(ok.is_consistent() && ok.error.is_none());
        assert!(blocked.is_consistent());
        assert!(failed.is_consistent());
        assert_eq!(failed.load_time, None);
    }

    #[test]
    fn test_accessible_with_error_is_inconsistent() {
        let mut result = ProbeResult::accessible(us(), 200, 1, "x", None, false, Utc::now());
        result.error = Some("boom".into());
        assert!(!result.is_consistent());
    }

    #[test]
    fn test_serializes_like_the_web_client() {
        let result = ProbeResult::blocked(us(), 0, 10, Some("timeout".into()), Utc::now());
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["status"], "blocked");
        assert_eq!(json["httpStatus"], 0);
        assert_eq!(json["country"]["code"], "US");
        assert!(json["cdn"].is_null());
        assert!(json.get("server").is_none());
    }
}
