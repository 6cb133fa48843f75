// src/models/mod.rs

//! Domain models for geoprobe.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod country;
mod result;
mod selection;

// Re-export all public types
pub use config::{Config, DispatchConfig, LiveConfig, SimulationConfig, StrategyKind};
pub use country::{CATALOG, Country};
pub use result::{ProbeResult, ProbeStatus};
pub use selection::{CountrySelection, MAX_SELECTED};
