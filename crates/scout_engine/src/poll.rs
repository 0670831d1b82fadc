use std::time::{Duration, Instant};

use scout_core::{JobStatus, SearchError, StatusClass};
use scout_logging::{scout_debug, scout_info, scout_warn};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, JobApi, ProgressSink};

/// Source of time for the poller, swappable in tests.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait::async_trait]
impl Clock for TokioClock {
    // Tokio's clock so that paused test time applies here too.
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay between every check.
    Fixed,
    /// Delay grows by `factor` after each check, capped at `max_interval`.
    Exponential { factor: f64, max_interval: Duration },
}

/// How long and how often to wait for a run to reach a terminal status.
///
/// The default checks every 3 seconds with no attempt or time limit.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub backoff: Backoff,
    pub max_attempts: Option<u32>,
    pub max_wait: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            backoff: Backoff::Fixed,
            max_attempts: None,
            max_wait: None,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_attempts.is_some() || self.max_wait.is_some()
    }

    /// Delay to use after a check that was preceded by `current`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential {
                factor,
                max_interval,
            } => {
                let factor = if factor.is_finite() { factor.max(1.0) } else { 1.0 };
                Duration::try_from_secs_f64(current.as_secs_f64() * factor)
                    .unwrap_or(max_interval)
                    .min(max_interval)
            }
        }
    }

    fn exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max) || self.past_deadline(elapsed)
    }

    fn past_deadline(&self, elapsed: Duration) -> bool {
        self.max_wait.is_some_and(|max| elapsed >= max)
    }

    /// Shortens `delay` so a sleep never runs past `max_wait`.
    fn clamp_to_deadline(&self, delay: Duration, elapsed: Duration) -> Duration {
        match self.max_wait {
            Some(max) => delay.min(max.saturating_sub(elapsed)),
            None => delay,
        }
    }
}

/// Checks the run's status until it succeeds, fails, runs out of policy or
/// is cancelled. Returns the number of status checks made.
///
/// The first check is immediate; cancellation is honoured both while a
/// request is in flight and while sleeping. No sleep extends past
/// `max_wait`, and reaching it ends the poll without a further check.
pub async fn poll_until_succeeded(
    api: &dyn JobApi,
    run_id: &str,
    policy: &RetryPolicy,
    clock: &dyn Clock,
    cancel: &CancellationToken,
    sink: &dyn ProgressSink,
) -> Result<u32, SearchError> {
    let started = clock.now();
    let mut delay = policy.interval;
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        attempt += 1;

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            result = api.run_status(run_id) => {
                result.map_err(|err| SearchError::Poll(err.to_string()))?
            }
        };
        scout_debug!("Run {} status check {}: {}", run_id, attempt, status);
        sink.emit(EngineEvent::StatusChecked {
            attempt,
            status: status.clone(),
        });

        match status.class() {
            StatusClass::Succeeded => {
                scout_info!("Run {} succeeded after {} checks", run_id, attempt);
                return Ok(attempt);
            }
            StatusClass::Failed => {
                scout_warn!("Run {} ended with status {}", run_id, status);
                return Err(SearchError::JobFailed { status });
            }
            StatusClass::Pending => {}
        }

        let elapsed = clock.now().saturating_duration_since(started);
        if policy.exhausted(attempt, elapsed) {
            return Err(give_up(run_id, &status, attempt, elapsed));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SearchError::Cancelled),
            _ = clock.sleep(policy.clamp_to_deadline(delay, elapsed)) => {}
        }
        let elapsed = clock.now().saturating_duration_since(started);
        if policy.past_deadline(elapsed) {
            return Err(give_up(run_id, &status, attempt, elapsed));
        }
        delay = policy.next_interval(delay);
    }
}

fn give_up(run_id: &str, status: &JobStatus, attempts: u32, elapsed: Duration) -> SearchError {
    scout_warn!(
        "Run {} still {} after {} checks, giving up",
        run_id,
        status,
        attempts
    );
    SearchError::PollTimeout {
        attempts,
        elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_keeps_interval() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.next_interval(Duration::from_secs(3)),
            Duration::from_secs(3)
        );
        assert!(!policy.is_bounded());
    }

    #[test]
    fn exponential_backoff_grows_to_cap() {
        let policy = RetryPolicy {
            interval: Duration::from_secs(1),
            backoff: Backoff::Exponential {
                factor: 2.0,
                max_interval: Duration::from_secs(5),
            },
            ..RetryPolicy::default()
        };
        let second = policy.next_interval(policy.interval);
        let third = policy.next_interval(second);
        let fourth = policy.next_interval(third);

        assert_eq!(second, Duration::from_secs(2));
        assert_eq!(third, Duration::from_secs(4));
        assert_eq!(fourth, Duration::from_secs(5));
    }

    #[test]
    fn exhausted_by_attempts_or_wait() {
        let policy = RetryPolicy::default()
            .with_max_attempts(3)
            .with_max_wait(Duration::from_secs(60));

        assert!(!policy.exhausted(2, Duration::from_secs(10)));
        assert!(policy.exhausted(3, Duration::from_secs(10)));
        assert!(policy.exhausted(1, Duration::from_secs(60)));
    }

    #[test]
    fn sleeps_are_clamped_to_max_wait() {
        let policy = RetryPolicy {
            interval: Duration::from_secs(30),
            ..RetryPolicy::default()
        }
        .with_max_wait(Duration::from_secs(5));

        assert_eq!(
            policy.clamp_to_deadline(Duration::from_secs(30), Duration::ZERO),
            Duration::from_secs(5)
        );
        assert_eq!(
            policy.clamp_to_deadline(Duration::from_secs(30), Duration::from_secs(7)),
            Duration::ZERO
        );
        let unbounded = RetryPolicy::default();
        assert_eq!(
            unbounded.clamp_to_deadline(Duration::from_secs(3), Duration::from_secs(99)),
            Duration::from_secs(3)
        );
    }
}
