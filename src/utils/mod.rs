//! Utility functions and helpers.

pub mod clock;
pub mod log;
pub mod url;

pub use clock::{Clock, TokioClock};
