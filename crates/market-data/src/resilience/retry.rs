//! Bounded retry with exponential backoff.
//!
//! [`retry`] is a pure control-flow combinator: it re-runs an async operation
//! until it succeeds or the attempt budget is spent, sleeping between attempts.
//! Every backoff wait races the caller's cancellation token.

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::errors::MarketDataError;

/// Retry budget and backoff bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; the operation runs at most `max_retries + 1` times.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single wait.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Policy that never waits, for callers that only want the attempt budget.
    pub const fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO, Duration::ZERO)
    }

    /// The sequence of waits between attempts: `base`, `2 * base`, ... capped at `max_delay`.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> {
        let max_delay = self.max_delay;
        let mut delay = self.base_delay.min(max_delay);
        (0..self.max_retries).map(move |_| {
            let current = delay;
            delay = delay.saturating_mul(2).min(max_delay);
            current
        })
    }
}

/// Upstream price calls: 3 retries, 500 ms base delay, 4 s cap.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(4))
    }
}

/// Run `operation` under `policy`.
///
/// Returns the first success, or the last operation error unchanged once the
/// budget is exhausted. If `cancel` fires during a backoff wait the call returns
/// [`MarketDataError::Cancelled`] immediately; an operation that itself reports
/// cancellation is not retried.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, MarketDataError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MarketDataError>>,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_cancelled() => return Err(error),
            Err(error) => error,
        };

        let Some(delay) = backoff.next() else {
            return Err(error);
        };

        debug!(
            "Attempt {} failed: {}. Retrying in {:?}",
            attempt, error, delay
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MarketDataError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn provider_error(message: &str) -> MarketDataError {
        MarketDataError::ProviderError {
            provider: "TEST".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let delays: Vec<Duration> = policy.backoff().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_secs(1),
                Duration::from_secs(2),
            ]
        );

        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(3));
        let delays: Vec<Duration> = policy.backoff().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(3),
                Duration::from_secs(3),
            ]
        );
    }

    #[test]
    fn test_backoff_caps_base_delay() {
        let policy = RetryPolicy::new(2, Duration::from_secs(10), Duration::from_secs(4));
        assert!(policy.backoff().all(|d| d == Duration::from_secs(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let policy = RetryPolicy::default();

        let start = Instant::now();
        let result = retry(&policy, &cancel, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(provider_error("flaky"))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two waits: 500ms then 1s
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_after_exhaustion() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let policy = RetryPolicy::default();

        let result: Result<(), _> = retry(&policy, &cancel, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err(provider_error(&format!("failure {}", n)))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(MarketDataError::ProviderError { message, .. }) => assert_eq!(message, "failure 4"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_success_does_not_wait() {
        let cancel = CancellationToken::new();
        let policy = RetryPolicy::new(3, Duration::from_secs(60), Duration::from_secs(60));

        let result = retry(&policy, &cancel, || async { Ok::<_, MarketDataError>(42) }).await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_wins() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let policy = RetryPolicy::new(3, Duration::from_secs(10), Duration::from_secs(10));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result: Result<(), _> = retry(&policy, &cancel, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(provider_error("down"))
        })
        .await;

        assert!(matches!(result, Err(MarketDataError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cancelled_operation_is_not_retried() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();

        let result: Result<(), _> = retry(&RetryPolicy::immediate(5), &cancel, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketDataError::Cancelled)
        })
        .await;

        assert!(matches!(result, Err(MarketDataError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
