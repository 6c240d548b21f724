//! Bounded-concurrency execution of independent task thunks

use super::config::ExecutorConfig;
use super::executor::drive;
use crate::error::Result;
use futures_util::future::{BoxFuture, FutureExt};
use std::future::Future;

/// Boxed zero-argument task, for batches mixing different closures
pub type Task<'a, T, E> =
    Box<dyn FnOnce() -> BoxFuture<'a, std::result::Result<T, E>> + Send + 'a>;

/// Box a task thunk so it can share a `Vec` with differently typed tasks
pub fn task<'a, T, E, F, Fut>(thunk: F) -> Task<'a, T, E>
where
    F: FnOnce() -> Fut + Send + 'a,
    Fut: Future<Output = std::result::Result<T, E>> + Send + 'a,
{
    Box::new(move || thunk().boxed())
}

/// Runs independent async tasks with a bounded number in flight
///
/// # Example
/// ```
/// use taskbatch::{task, BoundedParallelExecutor, Task};
///
/// # tokio_test::block_on(async {
/// let tasks: Vec<Task<'_, &str, String>> = vec![
///     task(|| async { Ok("first") }),
///     task(|| async { Ok("second") }),
/// ];
/// let results = BoundedParallelExecutor::default().run(tasks).await.unwrap();
/// assert_eq!(results, vec!["first", "second"]);
/// # });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedParallelExecutor {
    config: ExecutorConfig,
}

impl BoundedParallelExecutor {
    /// Create an executor from a validated config
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Create a chunked executor with the given limit
    ///
    /// # Errors
    /// [`Error::InvalidConcurrency`](crate::Error::InvalidConcurrency) when `concurrency < 1`
    pub fn with_concurrency(concurrency: i64) -> Result<Self> {
        ExecutorConfig::new(concurrency).map(Self::new)
    }

    /// Executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run every task, returning outputs in task order
    ///
    /// Tasks are started in index order, each only when it is admitted.
    ///
    /// The first error to settle is returned. In-flight siblings still run
    /// to completion first, so a failed run resolves no earlier than its
    /// slowest in-flight sibling.
    pub async fn run<I, F, Fut, T, E>(&self, tasks: I) -> std::result::Result<Vec<T>, E>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let thunks: Vec<F> = tasks.into_iter().collect();
        let jobs = thunks.into_iter().map(|thunk| thunk());
        drive(jobs, &self.config).await
    }
}

/// Validate `concurrency` and return the bounded run as a future
///
/// An invalid limit is returned as `Err` immediately, before any task starts.
/// A failing future resolves only after every sibling already in flight has
/// settled; see [`BoundedParallelExecutor::run`].
pub fn run_bounded<I, F, Fut, T, E>(
    tasks: I,
    concurrency: Option<i64>,
) -> Result<impl Future<Output = std::result::Result<Vec<T>, E>>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let executor = BoundedParallelExecutor::new(ExecutorConfig::from_option(concurrency)?);
    Ok(async move { executor.run(tasks).await })
}
