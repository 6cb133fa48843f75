// src/pipeline/check.rs

//! End-to-end accessibility check with console progress.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::probe;
use crate::utils::url::get_domain;
use crate::utils::{Clock, log};

use super::dispatch::{BatchDispatcher, CancelToken};
use super::results::{ResultSet, ResultStore};
use super::submit::{Submission, submit};

/// Run one submission with the configured strategy and pacing.
///
/// Prints each group as it completes and a summary at the end, and returns
/// the frozen result set.
pub async fn run_check(
    config: &Config,
    clock: Arc<dyn Clock>,
    submission: &Submission,
    cancel: &CancelToken,
) -> Result<ResultSet> {
    config.validate()?;

    let strategy = probe::from_config(config, Arc::clone(&clock))?;
    let (group_size, group_delay) = config.pacing();
    let dispatcher = BatchDispatcher::new(strategy, clock, group_size, group_delay)?;
    let total_groups = dispatcher.group_count(submission.countries.len());

    let mut store = ResultStore::new();
    let mut group = 0;

    log::header("geoprobe: website accessibility check");

    let outcome = submit(
        &dispatcher,
        &mut store,
        submission,
        config.dispatch.max_targets,
        cancel,
        |batch, set| {
            group += 1;
            log::step(
                group,
                total_groups,
                &format!("{} results ({} so far)", batch.len(), set.len()),
            );
            for result in batch {
                log::sub_item(&log::result_line(result));
            }
        },
    )
    .await?;

    let stats = store.stats();
    let host = get_domain(&outcome.url).unwrap_or_else(|| outcome.url.clone());
    log::summary(
        &host,
        &[
            ("Accessible", stats.accessible.to_string()),
            ("Blocked", stats.blocked.to_string()),
            ("Errors", stats.errored.to_string()),
            ("Total", stats.total.to_string()),
            (
                "Avg load",
                stats
                    .avg_load_ms
                    .map(|ms| format!("{ms}ms"))
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
            ("Elapsed", format!("{:.2?}", outcome.report.elapsed)),
        ],
    );
    if outcome.report.cancelled {
        log::info("Run was cancelled before all groups completed");
    } else {
        log::success("Check complete");
    }

    Ok(store.current().cloned().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{CATALOG, Country};
    use crate::utils::TokioClock;

    #[tokio::test(start_paused = true)]
    async fn test_run_check_simulated() {
        log::set_quiet(true);
        let config = Config::default();
        let countries = ["US", "CN", "RU", "DE", "FR", "JP", "IN"]
            .iter()
            .map(|c| *Country::find(c).unwrap())
            .collect();
        let submission = Submission::new("example", countries);

        let set = run_check(&config, Arc::new(TokioClock), &submission, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(set.url, "https://example.com");
        assert_eq!(set.len(), 7);
        assert!(set.is_finished());
        assert_eq!(set.stats().total, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_check_refuses_raised_target_limit() {
        log::set_quiet(true);
        let mut config = Config::default();
        config.dispatch.max_targets = 20;
        let submission = Submission::new("example", CATALOG.iter().take(15).copied().collect());

        let result = run_check(&config, Arc::new(TokioClock), &submission, &CancelToken::new()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_check_rejects_invalid_config() {
        let mut config = Config::default();
        config.dispatch.group_size = 0;
        let submission = Submission::new("example", vec![*Country::find("US").unwrap()]);
        let result = run_check(&config, Arc::new(TokioClock), &submission, &CancelToken::new()).await;
        assert!(result.is_err());
    }
}
