//! Probe that fetches the target once through an HTTP relay.
//!
//! The relay fetches on our behalf, so this observes the relay's vantage
//! point only; the country is carried through for reporting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::SERVER;

use super::cdn::{HeaderHints, describe_failure, detect_cdn};
use super::ProbeStrategy;
use crate::error::{AppError, Result};
use crate::models::{Country, LiveConfig, ProbeResult};
use crate::utils::Clock;
use crate::utils::url::{ensure_scheme, relay_url};

const UNKNOWN_SERVER: &str = "Unknown";

/// Relay-backed probe.
pub struct RelayProbe {
    client: Client,
    relay_base: String,
    clock: Arc<dyn Clock>,
}

impl RelayProbe {
    /// Create a relay probe with its own HTTP client.
    pub fn new(config: &LiveConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.relay_url.trim().is_empty() {
            return Err(AppError::config("live.relay_url is empty"));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            relay_base: config.relay_url.clone(),
            clock,
        })
    }
}

#[async_trait]
impl ProbeStrategy for RelayProbe {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn probe(&self, url: &str, country: &Country) -> Result<ProbeResult> {
        let target = ensure_scheme(url);
        let request_url = relay_url(&self.relay_base, &target);
        let start = Instant::now();

        let response = self.client.get(&request_url).send().await;
        let load_time = start.elapsed().as_millis() as u64;
        let now = self.clock.now();

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                log::debug!("Relay request for {} ({}) failed: {}", target, country.code, error);
                return Ok(ProbeResult::blocked(
                    *country,
                    0,
                    load_time,
                    Some(describe_failure(&error).to_string()),
                    now,
                ));
            }
        };

        let status = response.status();
        let headers = response.headers();
        let server = headers
            .get(SERVER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(UNKNOWN_SERVER)
            .to_string();
        let cdn = detect_cdn(&HeaderHints::from_headers(headers)).map(str::to_string);

        if status.is_success() {
            Ok(ProbeResult::accessible(
                *country,
                status.as_u16(),
                load_time,
                server,
                cdn,
                false,
                now,
            ))
        } else {
            Ok(
                ProbeResult::blocked(*country, status.as_u16(), load_time, None, now)
                    .with_response_meta(Some(server), cdn),
            )
        }
    }
}
