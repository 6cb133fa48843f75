// src/pipeline/results.rs

//! Accumulated results of the current run.
//!
//! The dispatcher never writes here directly. It hands out immutable
//! per-group batches, and the owner of a [`ResultStore`] folds them into the
//! live [`ResultSet`]. Every batch is tagged with the [`RunId`] it belongs
//! to; batches from a run that has since been replaced are dropped.

use serde::Serialize;

use crate::models::{ProbeResult, ProbeStatus};

/// Identifier of one run within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(u64);

/// Ordered results of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    /// Normalized URL under test
    pub url: String,
    results: Vec<ProbeResult>,
    #[serde(skip)]
    finished: bool,
}

impl ResultSet {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            results: Vec::new(),
            finished: false,
        }
    }

    /// Fold one group's batch into the set.
    fn apply(&mut self, batch: &[ProbeResult]) {
        self.results.extend_from_slice(batch);
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether the run that built this set has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Tally of outcomes so far.
    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats::default();
        let mut load_sum = 0u64;
        for result in &self.results {
            stats.total += 1;
            match result.status {
                ProbeStatus::Accessible => {
                    stats.accessible += 1;
                    if let Some(ms) = result.load_time {
                        load_sum += ms;
                    }
                }
                ProbeStatus::Blocked => stats.blocked += 1,
                ProbeStatus::Error => stats.errored += 1,
            }
        }
        if stats.accessible > 0 {
            stats.avg_load_ms = Some(load_sum / stats.accessible as u64);
        }
        stats
    }
}

/// Outcome counters for a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub accessible: usize,
    pub blocked: usize,
    pub errored: usize,
    pub total: usize,
    /// Mean load time of accessible results
    pub avg_load_ms: Option<u64>,
}

/// Holds the single live result set.
#[derive(Debug, Default)]
pub struct ResultStore {
    current: Option<(RunId, ResultSet)>,
    next_id: u64,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, discarding whatever the previous run produced.
    pub fn begin(&mut self, url: impl Into<String>) -> RunId {
        self.next_id += 1;
        let id = RunId(self.next_id);
        if let Some((previous, _)) = self.current.replace((id, ResultSet::new(url))) {
            log::debug!("Discarding results of run {:?}", previous);
        }
        id
    }

    /// Fold a batch into the live set. Returns `false` and ignores the batch
    /// if `run` is not the live run or has already finished.
    pub fn apply(&mut self, run: RunId, batch: &[ProbeResult]) -> bool {
        match self.live_mut(run) {
            Some(set) => {
                set.apply(batch);
                true
            }
            None => {
                log::debug!("Ignoring batch from stale run {:?}", run);
                false
            }
        }
    }

    /// Freeze the live set. Returns `false` if `run` is not the live run.
    pub fn finish(&mut self, run: RunId) -> bool {
        match self.live_mut(run) {
            Some(set) => {
                set.finished = true;
                true
            }
            None => false,
        }
    }

    /// The live result set, if any run has started.
    pub fn current(&self) -> Option<&ResultSet> {
        self.current.as_ref().map(|(_, set)| set)
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    /// Stats of the live set; all zero before the first run.
    pub fn stats(&self) -> RunStats {
        self.current().map(ResultSet::stats).unwrap_or_default()
    }

    fn live_mut(&mut self, run: RunId) -> Option<&mut ResultSet> {
        match &mut self.current {
            Some((id, set)) if *id == run && !set.finished => Some(set),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Country;

    fn result(code: &str, status: ProbeStatus, load: u64) -> ProbeResult {
        let country = *Country::find(code).unwrap();
        match status {
            ProbeStatus::Accessible => {
                ProbeResult::accessible(country, 200, load, "nginx", None, false, Utc::now())
            }
            ProbeStatus::Blocked => ProbeResult::blocked(country, 403, load, None, Utc::now()),
            ProbeStatus::Error => ProbeResult::error(country, "Test failed", Utc::now()),
        }
    }

    #[test]
    fn test_batches_accumulate_in_order() {
        let mut store = ResultStore::new();
        let run = store.begin("https://example.com");

        assert!(store.apply(run, &[result("US", ProbeStatus::Accessible, 100)]));
        assert!(store.apply(
            run,
            &[
                result("CN", ProbeStatus::Blocked, 50),
                result("DE", ProbeStatus::Accessible, 300)
            ]
        ));

        let codes: Vec<_> = store
            .current()
            .unwrap()
            .results()
            .iter()
            .map(|r| r.country.code)
            .collect();
        assert_eq!(codes, vec!["US", "CN", "DE"]);
    }

    #[test]
    fn test_new_run_discards_previous_and_resets_stats() {
        let mut store = ResultStore::new();
        let first = store.begin("https://a.com");
        store.apply(first, &[result("US", ProbeStatus::Accessible, 100)]);
        assert_eq!(store.stats().total, 1);

        let second = store.begin("https://b.com");
        assert_ne!(first, second);
        assert_eq!(store.stats(), RunStats::default());
        assert_eq!(store.current().unwrap().url, "https://b.com");

        // Late batch from the abandoned run is ignored.
        assert!(!store.apply(first, &[result("GB", ProbeStatus::Accessible, 1)]));
        assert!(store.current().unwrap().is_empty());
    }

    #[test]
    fn test_finished_set_is_frozen() {
        let mut store = ResultStore::new();
        let run = store.begin("https://a.com");
        store.apply(run, &[result("US", ProbeStatus::Accessible, 100)]);
        assert!(store.finish(run));
        assert!(store.current().unwrap().is_finished());
        assert!(!store.apply(run, &[result("GB", ProbeStatus::Accessible, 1)]));
        assert_eq!(store.current().unwrap().len(), 1);
    }

    #[test]
    fn test_stats() {
        let mut store = ResultStore::new();
        let run = store.begin("https://a.com");
        store.apply(
            run,
            &[
                result("US", ProbeStatus::Accessible, 100),
                result("GB", ProbeStatus::Accessible, 300),
                result("CN", ProbeStatus::Blocked, 120),
                result("RU", ProbeStatus::Error, 0),
            ],
        );

        let stats = store.stats();
        assert_eq!(stats.accessible, 2);
        assert_eq!(stats.blocked, 1);
        assert_eq!(stats.errored, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.avg_load_ms, Some(200));
    }
}
