//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::MAX_SELECTED;

/// Which probe implementation a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Simulated,
    Live,
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Probe implementation to use
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Group size and pacing
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Simulated probe parameters
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Relay probe parameters
    #[serde(default)]
    pub live: LiveConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.group_size == 0 {
            return Err(AppError::validation("dispatch.group_size must be > 0"));
        }
        if self.dispatch.max_targets == 0 {
            return Err(AppError::validation("dispatch.max_targets must be > 0"));
        }
        if self.dispatch.max_targets > MAX_SELECTED {
            return Err(AppError::validation(format!(
                "dispatch.max_targets must be <= {MAX_SELECTED}"
            )));
        }
        self.simulation.validate()?;
        self.live.validate()?;
        Ok(())
    }

    /// Group size and delay for the configured strategy.
    pub fn pacing(&self) -> (usize, Duration) {
        match self.strategy {
            StrategyKind::Simulated => (
                self.dispatch.group_size,
                Duration::from_millis(self.dispatch.group_delay_ms),
            ),
            StrategyKind::Live => (
                self.live.group_size,
                Duration::from_millis(self.live.group_delay_ms),
            ),
        }
    }
}

/// Batch dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Probes started together in one group
    #[serde(default = "defaults::group_size")]
    pub group_size: usize,

    /// Pause between groups in milliseconds
    #[serde(default = "defaults::group_delay")]
    pub group_delay_ms: u64,

    /// Maximum countries per submission
    #[serde(default = "defaults::max_targets")]
    pub max_targets: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            group_size: defaults::group_size(),
            group_delay_ms: defaults::group_delay(),
            max_targets: defaults::max_targets(),
        }
    }
}

/// Parameters of the simulated probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lower bound of the simulated response delay (inclusive)
    #[serde(default = "defaults::min_delay")]
    pub min_delay_ms: u64,

    /// Upper bound of the simulated response delay (exclusive)
    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,

    /// Country codes that may report the target as blocked
    #[serde(default = "defaults::restricted_countries")]
    pub restricted_countries: Vec<String>,

    /// Chance that a restricted country blocks the target
    #[serde(default = "defaults::block_probability")]
    pub block_probability: f64,

    #[serde(default = "defaults::min_load")]
    pub min_load_ms: u64,

    #[serde(default = "defaults::max_load")]
    pub max_load_ms: u64,

    /// Server label reported for accessible targets
    #[serde(default = "defaults::server_label")]
    pub server_label: String,

    /// CDN labels to pick from; an empty string stands for "no CDN"
    #[serde(default = "defaults::cdn_labels")]
    pub cdn_labels: Vec<String>,

    /// Chance that an accessible result is flagged as VPN-detected
    #[serde(default = "defaults::vpn_probability")]
    pub vpn_probability: f64,

    /// Makes results deterministic per (url, country) when set
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    fn validate(&self) -> Result<()> {
        if self.min_delay_ms >= self.max_delay_ms {
            return Err(AppError::validation(
                "simulation.min_delay_ms must be < simulation.max_delay_ms",
            ));
        }
        if self.min_load_ms >= self.max_load_ms {
            return Err(AppError::validation(
                "simulation.min_load_ms must be < simulation.max_load_ms",
            ));
        }
        for (name, p) in [
            ("block_probability", self.block_probability),
            ("vpn_probability", self.vpn_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(AppError::validation(format!(
                    "simulation.{name} must be within [0, 1]"
                )));
            }
        }
        if self.cdn_labels.is_empty() {
            return Err(AppError::validation("simulation.cdn_labels is empty"));
        }
        Ok(())
    }

    pub fn is_restricted(&self, code: &str) -> bool {
        self.restricted_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: defaults::min_delay(),
            max_delay_ms: defaults::max_delay(),
            restricted_countries: defaults::restricted_countries(),
            block_probability: defaults::block_probability(),
            min_load_ms: defaults::min_load(),
            max_load_ms: defaults::max_load(),
            server_label: defaults::server_label(),
            cdn_labels: defaults::cdn_labels(),
            vpn_probability: defaults::vpn_probability(),
            seed: None,
        }
    }
}

/// Parameters of the relay-backed probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Relay base URL; the percent-encoded target is appended to it
    #[serde(default = "defaults::relay_url")]
    pub relay_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for relay requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Group size when probing through the relay
    #[serde(default = "defaults::live_group_size")]
    pub group_size: usize,

    /// Pause between relay groups in milliseconds
    #[serde(default = "defaults::live_group_delay")]
    pub group_delay_ms: u64,
}

impl LiveConfig {
    fn validate(&self) -> Result<()> {
        if self.relay_url.trim().is_empty() {
            return Err(AppError::validation("live.relay_url is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::validation("live.timeout_secs must be > 0"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::validation("live.user_agent is empty"));
        }
        if self.group_size == 0 {
            return Err(AppError::validation("live.group_size must be > 0"));
        }
        Ok(())
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            relay_url: defaults::relay_url(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
            group_size: defaults::live_group_size(),
            group_delay_ms: defaults::live_group_delay(),
        }
    }
}

mod defaults {
    // Dispatch defaults
    pub fn group_size() -> usize {
        5
    }
    pub fn group_delay() -> u64 {
        200
    }
    pub fn max_targets() -> usize {
        super::MAX_SELECTED
    }

    // Simulation defaults
    pub fn min_delay() -> u64 {
        100
    }
    pub fn max_delay() -> u64 {
        400
    }
    pub fn restricted_countries() -> Vec<String> {
        vec!["CN".into(), "RU".into()]
    }
    pub fn block_probability() -> f64 {
        0.7
    }
    pub fn min_load() -> u64 {
        300
    }
    pub fn max_load() -> u64 {
        2300
    }
    pub fn server_label() -> String {
        "nginx/1.21.0".into()
    }
    pub fn cdn_labels() -> Vec<String> {
        vec![
            "Cloudflare".into(),
            "CloudFront".into(),
            "Akamai".into(),
            "Fastly".into(),
            String::new(),
        ]
    }
    pub fn vpn_probability() -> f64 {
        0.1
    }

    // Live defaults
    pub fn relay_url() -> String {
        "https://api.allorigins.win/raw?url=".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn live_group_size() -> usize {
        3
    }
    pub fn live_group_delay() -> u64 {
        500
    }
}
