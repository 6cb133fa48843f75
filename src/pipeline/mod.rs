//! Pipeline entry points.
//!
//! - `submit`: validate a submission and fold its groups into a result store
//! - `run_check`: `submit` with the configured strategy and console output

pub mod check;
pub mod dispatch;
pub mod results;
pub mod submit;

pub use check::run_check;
pub use dispatch::{BatchDispatcher, CancelToken, PROBE_FAILED_MESSAGE, RunReport};
pub use results::{ResultSet, ResultStore, RunId, RunStats};
pub use submit::{Submission, SubmitOutcome, submit};
