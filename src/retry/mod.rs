//! Retry with backoff
//!
//! [`RetryPolicy`] is plain validated data, [`RetryExecutor`] runs the loop
//! and a [`Sleeper`] provides the delay between attempts.
//!
//! # Backoff strategies
//!
//! For the attempt `n` that just failed and base delay `b`:
//!
//! - **Fixed**: `b`
//! - **Linear**: `b × n` (100ms, 200ms, 300ms, ...)
//! - **Exponential**: `b × 2^(n-1)` (100ms, 200ms, 400ms, ...)
//!
//! # Retrying each item of a batch
//!
//! The bounded executors never retry on their own; wrap the work function:
//!
//! ```
//! use taskbatch::{BoundedMapExecutor, RecordingSleeper, RetryExecutor, RetryPolicy};
//!
//! # tokio_test::block_on(async {
//! let retry = RetryExecutor::new(RetryPolicy::default()).with_sleeper(RecordingSleeper::new());
//! let results = BoundedMapExecutor::with_concurrency(2)
//!     .unwrap()
//!     .map(vec![1, 2, 3], |n, _| {
//!         let retry = &retry;
//!         async move { retry.run(|| async move { Ok::<_, String>(n * n) }).await }
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(results, vec![1, 4, 9]);
//! # });
//! ```

mod executor;
mod policy;
mod sleeper;

pub use executor::{retry, RetryExecutor};
pub use policy::{
    BackoffStrategy, RetryPolicy, RetryPolicyBuilder, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS,
};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
