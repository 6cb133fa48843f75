// src/pipeline/dispatch.rs

//! Grouped probe dispatch.
//!
//! Targets are split into consecutive groups. Every probe of a group runs
//! concurrently; the group's results are handed to the observer in input
//! order once all of them have settled, then the dispatcher pauses before the
//! next group.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;

use crate::error::{AppError, Result};
use crate::models::{Country, ProbeResult};
use crate::probe::ProbeStrategy;
use crate::utils::Clock;

/// Message recorded when a probe faults instead of producing a result.
pub const PROBE_FAILED_MESSAGE: &str = "Test failed";

/// Cooperative cancellation flag, checked before each group is dispatched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Summary of one dispatch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Groups delivered to the observer
    pub groups: usize,
    /// Results delivered across all groups
    pub results: usize,
    /// Whether remaining groups were skipped by cancellation
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Runs probes in paced, fixed-size groups.
pub struct BatchDispatcher {
    strategy: Arc<dyn ProbeStrategy>,
    clock: Arc<dyn Clock>,
    group_size: usize,
    group_delay: Duration,
}

impl BatchDispatcher {
    /// Create a dispatcher. `group_size` must be at least 1.
    pub fn new(
        strategy: Arc<dyn ProbeStrategy>,
        clock: Arc<dyn Clock>,
        group_size: usize,
        group_delay: Duration,
    ) -> Result<Self> {
        if group_size == 0 {
            return Err(AppError::config("group size must be > 0"));
        }
        Ok(Self {
            strategy,
            clock,
            group_size,
            group_delay,
        })
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Number of groups `count` targets split into.
    pub fn group_count(&self, count: usize) -> usize {
        count.div_ceil(self.group_size)
    }

    /// Probe every target, delivering each group's results to `on_group`.
    pub async fn run<F>(&self, url: &str, targets: &[Country], on_group: F) -> RunReport
    where
        F: FnMut(Vec<ProbeResult>),
    {
        self.run_until(url, targets, &CancelToken::new(), on_group)
            .await
    }

    /// Like [`run`](Self::run), but stops before the next group once
    /// `cancel` is set. Groups already delivered are unaffected.
    pub async fn run_until<F>(
        &self,
        url: &str,
        targets: &[Country],
        cancel: &CancelToken,
        mut on_group: F,
    ) -> RunReport
    where
        F: FnMut(Vec<ProbeResult>),
    {
        let started = self.clock.instant();
        let total = self.group_count(targets.len());
        let mut report = RunReport {
            groups: 0,
            results: 0,
            cancelled: false,
            elapsed: Duration::ZERO,
        };

        for (index, group) in targets.chunks(self.group_size).enumerate() {
            if cancel.is_cancelled() {
                log::info!("Run cancelled after {}/{} groups", index, total);
                report.cancelled = true;
                break;
            }

            log::debug!(
                "Dispatching group {}/{} ({} targets)",
                index + 1,
                total,
                group.len()
            );
            let results = join_all(group.iter().map(|country| self.probe_one(url, country))).await;

            report.groups += 1;
            report.results += results.len();
            on_group(results);

            // A cancel raised by `on_group` skips the pause as well.
            if index + 1 < total && !cancel.is_cancelled() {
                self.clock.sleep(self.group_delay).await;
            }
        }

        report.elapsed = self.clock.instant() - started;
        report
    }

    /// Run one probe, converting faults into an error result.
    async fn probe_one(&self, url: &str, country: &Country) -> ProbeResult {
        let outcome = AssertUnwindSafe(self.strategy.probe(url, country))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => {
                log::warn!("Error testing {}: {}", country.name, error);
                ProbeResult::error(*country, PROBE_FAILED_MESSAGE, self.clock.now())
            }
            Err(_) => {
                log::error!("Probe for {} panicked", country.name);
                ProbeResult::error(*country, PROBE_FAILED_MESSAGE, self.clock.now())
            }
        }
    }
}
