// src/pipeline/submit.rs

//! Submission entry point: validate, normalize, dispatch, accumulate.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{Country, MAX_SELECTED, ProbeResult};
use crate::utils::url::normalize;

use super::dispatch::{BatchDispatcher, CancelToken, RunReport};
use super::results::{ResultSet, ResultStore, RunId};

/// A request to test one URL from a set of countries.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Raw user input; normalized before dispatch
    pub url: String,
    pub countries: Vec<Country>,
}

impl Submission {
    pub fn new(url: impl Into<String>, countries: Vec<Country>) -> Self {
        Self {
            url: url.into(),
            countries,
        }
    }

    /// Reject submissions that must not start a run.
    ///
    /// `max_targets` never raises the limit above [`MAX_SELECTED`].
    pub fn validate(&self, max_targets: usize) -> Result<()> {
        let max_targets = max_targets.min(MAX_SELECTED);
        if self.url.trim().is_empty() {
            return Err(AppError::validation("URL is required"));
        }
        if self.countries.is_empty() {
            return Err(AppError::validation("Select at least one country"));
        }
        if self.countries.len() > max_targets {
            return Err(AppError::validation(format!(
                "At most {max_targets} countries can be tested at once (got {})",
                self.countries.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.countries.iter().find(|c| !seen.insert(c.code)) {
            return Err(AppError::validation(format!(
                "Country {} selected more than once",
                dup.code
            )));
        }
        Ok(())
    }
}

/// What a completed submission produced.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub run: RunId,
    /// URL actually probed
    pub url: String,
    pub report: RunReport,
}

/// Run a submission to completion.
///
/// Validation happens before anything else: a rejected submission leaves
/// `store` untouched. Otherwise a new run replaces the store's previous one,
/// every group is folded into it as it arrives, and `on_progress` sees the
/// group together with the accumulated set.
pub async fn submit<F>(
    dispatcher: &BatchDispatcher,
    store: &mut ResultStore,
    submission: &Submission,
    max_targets: usize,
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<SubmitOutcome>
where
    F: FnMut(&[ProbeResult], &ResultSet),
{
    submission.validate(max_targets)?;

    let url = normalize(&submission.url);
    let run = store.begin(url.clone());
    log::info!(
        "Testing {} from {} countries",
        url,
        submission.countries.len()
    );

    let report = dispatcher
        .run_until(&url, &submission.countries, cancel, |batch| {
            if store.apply(run, &batch) {
                if let Some(set) = store.current() {
                    on_progress(batch.as_slice(), set);
                }
            }
        })
        .await;

    store.finish(run);
    log::info!(
        "Run finished: {} results in {} groups ({:?})",
        report.results,
        report.groups,
        report.elapsed
    );

    Ok(SubmitOutcome { run, url, report })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::models::{CATALOG, ProbeStatus, SimulationConfig};
    use crate::probe::SimulatedProbe;
    use crate::utils::TokioClock;

    fn countries(codes: &[&str]) -> Vec<Country> {
        codes.iter().map(|c| *Country::find(c).unwrap()).collect()
    }

    fn simulated_dispatcher(group_size: usize) -> BatchDispatcher {
        let clock = Arc::new(TokioClock);
        let probe = Arc::new(SimulatedProbe::new(SimulationConfig::default(), clock.clone()));
        BatchDispatcher::new(probe, clock, group_size, Duration::from_millis(200)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_example_with_two_countries() {
        let dispatcher = simulated_dispatcher(5);
        let mut store = ResultStore::new();
        let submission = Submission::new("example", countries(&["US", "CN"]));

        let mut calls = 0;
        let outcome = submit(
            &dispatcher,
            &mut store,
            &submission,
            10,
            &CancelToken::new(),
            |_, _| calls += 1,
        )
        .await
        .unwrap();

        assert_eq!(outcome.url, "https://example.com");
        assert_eq!(calls, 1);

        let set = store.current().unwrap();
        assert!(set.is_finished());
        let codes: Vec<_> = set.results().iter().map(|r| r.country.code).collect();
        assert_eq!(codes, vec!["US", "CN"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_target_reported_exactly_once() {
        let dispatcher = simulated_dispatcher(3);
        let mut store = ResultStore::new();
        let selected: Vec<Country> = CATALOG.iter().take(10).copied().collect();
        let submission = Submission::new("https://example.com", selected.clone());

        let mut seen_lengths = Vec::new();
        submit(
            &dispatcher,
            &mut store,
            &submission,
            10,
            &CancelToken::new(),
            |_, set| seen_lengths.push(set.len()),
        )
        .await
        .unwrap();

        assert_eq!(seen_lengths, vec![3, 6, 9, 10]);

        let set = store.current().unwrap();
        assert_eq!(set.len(), selected.len());
        let codes: HashSet<_> = set.results().iter().map(|r| r.country.code).collect();
        let expected: HashSet<_> = selected.iter().map(|c| c.code).collect();
        assert_eq!(codes, expected);
        for result in set.results() {
            assert!(result.is_consistent());
            if result.status == ProbeStatus::Accessible {
                assert!(result.error.is_none());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_submission_starts_no_run() {
        let dispatcher = simulated_dispatcher(5);
        let mut store = ResultStore::new();

        for submission in [
            Submission::new("   ", countries(&["US"])),
            Submission::new("example", Vec::new()),
            Submission::new("example", countries(&["US", "US"])),
            Submission::new("example", CATALOG.iter().take(11).copied().collect()),
        ] {
            let result = submit(
                &dispatcher,
                &mut store,
                &submission,
                10,
                &CancelToken::new(),
                |_, _| {},
            )
            .await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(store.current().is_none());
    }

    #[test]
    fn test_limit_never_exceeds_max_selected() {
        let submission = Submission::new("example", CATALOG.iter().take(15).copied().collect());
        assert!(matches!(
            submission.validate(20),
            Err(AppError::Validation(_))
        ));

        let ten = Submission::new("example", CATALOG.iter().take(10).copied().collect());
        assert!(ten.validate(20).is_ok());
        assert!(ten.validate(5).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submission_replaces_first() {
        let dispatcher = simulated_dispatcher(5);
        let mut store = ResultStore::new();
        let cancel = CancelToken::new();

        let first = submit(
            &dispatcher,
            &mut store,
            &Submission::new("a.com", countries(&["US", "GB", "DE"])),
            10,
            &cancel,
            |_, _| {},
        )
        .await
        .unwrap();
        let second = submit(
            &dispatcher,
            &mut store,
            &Submission::new("b.com", countries(&["JP"])),
            10,
            &cancel,
            |_, _| {},
        )
        .await
        .unwrap();

        assert_ne!(first.run, second.run);
        assert_eq!(store.current_run(), Some(second.run));
        let set = store.current().unwrap();
        assert_eq!(set.url, "https://b.com");
        assert_eq!(set.len(), 1);
    }
}
