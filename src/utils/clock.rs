//! Time source shared by the dispatcher and the probes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Wall-clock timestamps, monotonic instants and suspension.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current timestamp for new results.
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic instant for measuring durations.
    fn instant(&self) -> Instant;

    /// Suspend the calling task.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by `tokio::time`.
///
/// Under a paused tokio runtime (`start_paused = true`) sleeps complete
/// instantly in virtual time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_instant_follows_paused_sleep() {
        let clock = TokioClock;
        let started = clock.instant();
        clock.sleep(Duration::from_secs(5)).await;
        assert_eq!(clock.instant() - started, Duration::from_secs(5));
    }
}
