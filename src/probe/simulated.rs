//! Randomized probe that stands in for real geographic measurement.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use super::ProbeStrategy;
use crate::error::Result;
use crate::models::{Country, ProbeResult, SimulationConfig};
use crate::utils::Clock;

const BLOCKED_MESSAGE: &str = "Access forbidden from this country";
const BLOCKED_STATUS: u16 = 403;
const OK_STATUS: u16 = 200;

/// Everything random about one simulated probe, drawn up front.
///
/// All values are drawn in a fixed order regardless of outcome, so a seeded
/// generator yields the same result for the same (url, country).
#[derive(Debug)]
struct Draw {
    delay_ms: u64,
    blocked: bool,
    load_ms: u64,
    cdn: Option<String>,
    vpn_detected: bool,
}

impl Draw {
    fn sample<R: Rng>(rng: &mut R, config: &SimulationConfig, restricted: bool) -> Self {
        let delay_ms = range(rng, config.min_delay_ms, config.max_delay_ms);
        let block_roll: f64 = rng.r#gen();
        let load_ms = range(rng, config.min_load_ms, config.max_load_ms);
        let cdn = config
            .cdn_labels
            .choose(rng)
            .filter(|label| !label.is_empty())
            .cloned();
        let vpn_roll: f64 = rng.r#gen();

        Self {
            delay_ms,
            blocked: restricted && block_roll < config.block_probability,
            load_ms,
            cdn,
            vpn_detected: vpn_roll < config.vpn_probability,
        }
    }
}

fn range<R: Rng>(rng: &mut R, low: u64, high: u64) -> u64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Simulated probe with configurable blocking behavior.
pub struct SimulatedProbe {
    config: SimulationConfig,
    clock: Arc<dyn Clock>,
}

impl SimulatedProbe {
    pub fn new(config: SimulationConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    fn rng_for(&self, url: &str, country: &Country) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(derive_seed(seed, url, country.code)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Stable per-(url, country) seed.
fn derive_seed(seed: u64, url: &str, code: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(url.as_bytes());
    hasher.update([0u8]);
    hasher.update(code.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

#[async_trait]
impl ProbeStrategy for SimulatedProbe {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn probe(&self, url: &str, country: &Country) -> Result<ProbeResult> {
        let restricted = self.config.is_restricted(country.code);
        let draw = Draw::sample(&mut self.rng_for(url, country), &self.config, restricted);

        self.clock.sleep(Duration::from_millis(draw.delay_ms)).await;
        let now = self.clock.now();

        if draw.blocked {
            log::debug!("{} blocked {} (simulated)", country.code, url);
            return Ok(ProbeResult::blocked(
                *country,
                BLOCKED_STATUS,
                draw.delay_ms,
                Some(BLOCKED_MESSAGE.to_string()),
                now,
            ));
        }

        Ok(ProbeResult::accessible(
            *country,
            OK_STATUS,
            draw.load_ms,
            self.config.server_label.clone(),
            draw.cdn,
            draw.vpn_detected,
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;
    use crate::models::ProbeStatus;
    use crate::utils::TokioClock;

    fn probe_with(config: SimulationConfig) -> SimulatedProbe {
        SimulatedProbe::new(config, Arc::new(TokioClock))
    }

    fn country(code: &str) -> Country {
        *Country::find(code).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_restricted_country_blocked_when_rule_fires() {
        let probe = probe_with(SimulationConfig {
            block_probability: 1.0,
            ..SimulationConfig::default()
        });

        let result = probe.probe("https://example.com", &country("RU")).await.unwrap();
        assert_eq!(result.status, ProbeStatus::Blocked);
        assert_eq!(result.http_status, Some(403));
        assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(result.is_consistent());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrestricted_country_is_accessible() {
        let probe = probe_with(SimulationConfig {
            block_probability: 1.0,
            ..SimulationConfig::default()
        });

        for _ in 0..20 {
            let result = probe.probe("https://example.com", &country("US")).await.unwrap();
            assert_eq!(result.status, ProbeStatus::Accessible);
            assert_eq!(result.http_status, Some(200));
            assert_eq!(result.server.as_deref(), Some("nginx/1.21.0"));
            assert!(result.error.is_none());
            let load = result.load_time.unwrap();
            assert!((300..2300).contains(&load));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restricted_country_passes_when_probability_zero() {
        let probe = probe_with(SimulationConfig {
            block_probability: 0.0,
            ..SimulationConfig::default()
        });
        let result = probe.probe("https://example.com", &country("CN")).await.unwrap();
        assert!(result.is_accessible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_within_bounds() {
        let probe = probe_with(SimulationConfig::default());
        let start = Instant::now();
        probe.probe("https://example.com", &country("JP")).await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_results_repeat_per_url_and_country() {
        let config = SimulationConfig {
            seed: Some(42),
            ..SimulationConfig::default()
        };
        let a = probe_with(config.clone());
        let b = probe_with(config);

        for code in ["US", "CN", "RU", "DE"] {
            let x = a.probe("https://example.com", &country(code)).await.unwrap();
            let y = b.probe("https://example.com", &country(code)).await.unwrap();
            assert_eq!(x.status, y.status);
            assert_eq!(x.load_time, y.load_time);
            assert_eq!(x.cdn, y.cdn);
            assert_eq!(x.vpn_detected, y.vpn_detected);
        }
    }

    #[test]
    fn test_derive_seed_depends_on_inputs() {
        let base = derive_seed(1, "https://a.com", "US");
        assert_eq!(base, derive_seed(1, "https://a.com", "US"));
        assert_ne!(base, derive_seed(2, "https://a.com", "US"));
        assert_ne!(base, derive_seed(1, "https://b.com", "US"));
        assert_ne!(base, derive_seed(1, "https://a.com", "CA"));
    }

    #[test]
    fn test_empty_cdn_label_means_none() {
        let config = SimulationConfig {
            cdn_labels: vec![String::new()],
            ..SimulationConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let draw = Draw::sample(&mut rng, &config, false);
        assert!(draw.cdn.is_none());
        assert!(!draw.blocked);
    }
}
