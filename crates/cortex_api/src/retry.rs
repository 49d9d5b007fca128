use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Bounded exponential-backoff budget for one retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wall-clock budget checked before each attempt.
    pub max_elapsed: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            max_elapsed: Duration::from_secs(120),
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Deterministic delay before retrying attempt `attempt` (0-indexed):
    /// min(base_delay × 2^attempt, max_delay), no jitter.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(30);
        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay)
    }
}

/// Terminal outcome of an exhausted retry loop.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The wall-clock budget ran out before an attempt could start.
    Timeout { elapsed: Duration },
    /// Every attempt failed; carries the last underlying error.
    Operation(E),
}

/// Invoke `operation` under `policy`, sleeping between failed attempts.
///
/// The sleeps are cooperative suspensions; dropping the returned future is
/// the cancellation mechanism.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        let elapsed = started.elapsed();
        if elapsed > policy.max_elapsed {
            return Err(RetryError::Timeout { elapsed });
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                debug!(attempt, "attempt failed; backing off");
                last_error = Some(error);
                if attempt + 1 < policy.max_attempts {
                    tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                }
            }
        }
    }

    Err(match last_error {
        Some(error) => RetryError::Operation(error),
        // max_attempts of zero never ran the operation.
        None => RetryError::Timeout {
            elapsed: started.elapsed(),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::{retry_with_backoff, RetryError, RetryPolicy};

    fn counted_failures(
        calls: &Arc<AtomicU32>,
        success_attempt: u32,
    ) -> impl FnMut() -> futures_util::future::Ready<Result<&'static str, &'static str>> {
        let counter = Arc::clone(calls);
        move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            if attempt < success_attempt {
                futures_util::future::ready(Err("transient"))
            } else {
                futures_util::future::ready(Ok("done"))
            }
        }
    }

    #[test]
    fn delay_doubles_up_to_the_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(5000));
        assert_eq!(policy.delay_for_attempt(30), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures_with_deterministic_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let operation = counted_failures(&calls, 3);
        let started = tokio::time::Instant::now();

        let result = retry_with_backoff(RetryPolicy::default(), operation).await;

        assert!(matches!(result, Ok("done")));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 1000 + 2000 + 4000 ms of cumulative backoff.
        assert_eq!(started.elapsed(), Duration::from_millis(7000));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_reraise_the_last_error() {
        let policy = RetryPolicy::default()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(10));

        let result: Result<(), _> =
            retry_with_backoff(policy, || futures_util::future::ready(Err("boom"))).await;

        assert!(matches!(result, Err(RetryError::Operation("boom"))));
    }

    #[tokio::test(start_paused = true)]
    async fn exceeding_the_duration_budget_times_out() {
        let policy = RetryPolicy::default().with_max_elapsed(Duration::from_millis(3500));
        let calls = Arc::new(AtomicU32::new(0));
        let operation = counted_failures(&calls, u32::MAX);

        let result = retry_with_backoff(policy, operation).await;

        // Attempts at t=0, 1000, 3000; the t=7000 check exceeds the budget.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(
            matches!(result, Err(RetryError::Timeout { elapsed }) if elapsed >= Duration::from_millis(3500))
        );
    }
}
