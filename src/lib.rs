//! # Taskbatch - bounded async batches and retries
//!
//! Run many asynchronous operations without letting more than a fixed number
//! run at once, get the results back in input order, and retry flaky
//! operations with a configurable backoff.
//!
//! ## Features
//!
//! - **Bounded map** - [`BoundedMapExecutor`] applies `f(item, index)` to every item
//! - **Bounded task batch** - [`BoundedParallelExecutor`] runs zero-argument task thunks
//! - **Retry** - [`RetryExecutor`] with fixed, linear or exponential backoff
//! - **Order preserving** - `result[i]` always belongs to `input[i]`
//! - **Runtime agnostic core** - futures are polled on the caller's task, nothing is spawned
//!
//! ## Quick Start
//!
//! ```rust
//! use taskbatch::{map_bounded, Error};
//!
//! # tokio_test::block_on(async {
//! // Validation happens up front: an invalid limit is an immediate Err
//! let squares = map_bounded(
//!     vec![1, 2, 3, 4],
//!     |n, _index| async move { Ok::<_, String>(n * n) },
//!     Some(2),
//! )?;
//!
//! assert_eq!(squares.await.unwrap(), vec![1, 4, 9, 16]);
//! # Ok::<(), Error>(())
//! # }).unwrap();
//! ```
//!
//! ## Admission
//!
//! By default items are admitted in chunks of `concurrency`: every item of a
//! chunk starts together and the next chunk starts once the whole chunk has
//! settled. [`AdmissionMode::Window`] instead keeps the window full, starting
//! the next item as soon as any in-flight item settles. Both modes preserve
//! order and never exceed the limit.
//!
//! ## Error Handling
//!
//! There are two tiers:
//!
//! - Parameter validation returns [`Error`] synchronously, before any work is
//!   scheduled. [`Error::kind`] separates wrong types from out-of-range values.
//! - Operational failures are the caller's own error type, surfaced through
//!   the returned future. A failed batch returns the first error to settle;
//!   already running siblings are not cancelled and their results are dropped.
//!   Because those siblings are still polled, the error only reaches the
//!   caller once the slowest of them has settled.
//!
//! ```rust
//! use taskbatch::{BoundedMapExecutor, Error};
//!
//! let err = BoundedMapExecutor::with_concurrency(0).unwrap_err();
//! assert!(matches!(err, Error::InvalidConcurrency { value: 0 }));
//! assert!(err.to_string().contains("must be at least 1"));
//! ```
//!
//! ## License
//!
//! Licensed under the [MIT License](https://opensource.org/licenses/MIT).

/// Version of the taskbatch crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
pub mod error;
pub mod parallel;
pub mod retry;

// Re-export main types
pub use error::{Error, ErrorKind, Result};
pub use parallel::{
    map_bounded, run_bounded, task, AdmissionMode, BoundedMapExecutor, BoundedParallelExecutor,
    ExecutorConfig, Task, DEFAULT_CONCURRENCY,
};
pub use retry::{
    retry, BackoffStrategy, RecordingSleeper, RetryExecutor, RetryPolicy, RetryPolicyBuilder,
    Sleeper, TokioSleeper,
};
