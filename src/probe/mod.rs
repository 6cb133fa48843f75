//! Probe strategies.
//!
//! A probe checks one URL from one country and yields a [`ProbeResult`].
//! Two implementations share the [`ProbeStrategy`] seam:
//! - [`SimulatedProbe`]: randomized stand-in for real measurement
//! - [`RelayProbe`]: a single fetch through a public relay

mod cdn;
mod live;
mod simulated;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Config, Country, ProbeResult, StrategyKind};
use crate::utils::Clock;

pub use cdn::{HeaderHints, describe_failure, detect_cdn};
pub use live::RelayProbe;
pub use simulated::SimulatedProbe;

/// Something that can check a URL from a country.
///
/// Implementations must not touch shared state: everything a probe learns
/// goes into the returned result. An `Err` means the probe itself faulted;
/// the dispatcher turns it into an error result.
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Probe `url` as seen from `country`.
    async fn probe(&self, url: &str, country: &Country) -> Result<ProbeResult>;
}

/// Build the strategy selected in the configuration.
pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Arc<dyn ProbeStrategy>> {
    let strategy: Arc<dyn ProbeStrategy> = match config.strategy {
        StrategyKind::Simulated => Arc::new(SimulatedProbe::new(config.simulation.clone(), clock)),
        StrategyKind::Live => Arc::new(RelayProbe::new(&config.live, clock)?),
    };
    log::debug!("Using {} probe strategy", strategy.name());
    Ok(strategy)
}
