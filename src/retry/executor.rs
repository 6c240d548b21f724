//! Retry loop

use super::policy::RetryPolicy;
use super::sleeper::{Sleeper, TokioSleeper};
use std::fmt::Display;
use std::future::Future;

/// Re-runs an async operation until it succeeds or the policy's attempts run out
///
/// Attempts are strictly sequential. After a failed attempt `n` (other than
/// the last) the retry hook is called with `(n, &error)`, then the executor
/// sleeps for [`RetryPolicy::delay_for`]`(n)`. When every attempt fails the
/// error of the final attempt is returned unchanged.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use taskbatch::{RecordingSleeper, RetryExecutor, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let calls = AtomicU32::new(0);
/// let sleeper = Arc::new(RecordingSleeper::new());
/// let executor = RetryExecutor::new(RetryPolicy::default()).with_sleeper(sleeper.clone());
///
/// let value = executor
///     .run(|| async {
///         if calls.fetch_add(1, Ordering::SeqCst) == 0 {
///             Err("warming up")
///         } else {
///             Ok(7)
///         }
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(value, 7);
/// assert_eq!(sleeper.delays().len(), 1);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl RetryExecutor<TokioSleeper> {
    /// Create an executor that sleeps on the tokio timer
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl<S: Sleeper> RetryExecutor<S> {
    /// Replace the sleeper, e.g. with a [`RecordingSleeper`](super::RecordingSleeper)
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> RetryExecutor<S2> {
        RetryExecutor {
            policy: self.policy,
            sleeper,
        }
    }

    /// Retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` under the policy
    pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_with_hook(op, |_, _| {}).await
    }

    /// Run `op` under the policy, calling `on_retry(attempt, &error)` after
    /// every failed attempt that will be retried
    ///
    /// `on_retry` is never called on success or for the final attempt.
    pub async fn run_with_hook<T, E, F, Fut, H>(&self, mut op: F, mut on_retry: H) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        H: FnMut(u32, &E),
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1u32;

        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(attempt, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if attempt >= max_attempts => {
                    tracing::warn!(attempts = attempt, error = %err, "retries exhausted");
                    return Err(err);
                }
                Err(err) => {
                    on_retry(attempt, &err);
                    let delay = self.policy.delay_for(attempt);
                    tracing::debug!(
                        attempt,
                        max_attempts,
                        delay = ?delay,
                        error = %err,
                        "attempt failed, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Run `op` under `policy`, sleeping on the tokio timer
pub async fn retry<T, E, F, Fut>(op: F, policy: RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryExecutor::new(policy).run(op).await
}
