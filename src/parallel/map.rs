//! Bounded-concurrency async map

use super::config::ExecutorConfig;
use super::executor::drive;
use crate::error::Result;
use std::future::Future;

/// Applies an async transform to every item with a bounded number in flight
///
/// # Example
/// ```
/// use taskbatch::BoundedMapExecutor;
///
/// # tokio_test::block_on(async {
/// let executor = BoundedMapExecutor::with_concurrency(2).unwrap();
/// let doubled = executor
///     .map(vec![1, 2, 3], |n, _index| async move { Ok::<_, String>(n * 2) })
///     .await
///     .unwrap();
/// assert_eq!(doubled, vec![2, 4, 6]);
/// # });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedMapExecutor {
    config: ExecutorConfig,
}

impl BoundedMapExecutor {
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

    /// Apply `transform(item, index)` to every item
    ///
    /// `result[i]` is the output for `items[i]` regardless of completion
    /// order. The transform is called once per item, in index order, and
    /// never for an empty input.
    ///
    /// The first error to settle is returned. In-flight siblings still run
    /// to completion first, so a failed map resolves no earlier than its
    /// slowest in-flight sibling.
    pub async fn map<I, T, R, E, F, Fut>(
        &self,
        items: I,
        mut transform: F,
    ) -> std::result::Result<Vec<R>, E>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(T, usize) -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
    {
        let items: Vec<T> = items.into_iter().collect();
        let jobs = items
            .into_iter()
            .enumerate()
            .map(move |(index, item)| transform(item, index));
        drive(jobs, &self.config).await
    }
}

/// Validate `concurrency` and return the bounded map as a future
///
/// Validation happens before anything is scheduled: an invalid limit is
/// returned as `Err` immediately and `transform` is never called.
/// `None` uses [`DEFAULT_CONCURRENCY`](super::DEFAULT_CONCURRENCY).
///
/// A failing future resolves only after every sibling already in flight
/// has settled; see [`BoundedMapExecutor::map`].
pub fn map_bounded<I, T, R, E, F, Fut>(
    items: I,
    transform: F,
    concurrency: Option<i64>,
) -> Result<impl Future<Output = std::result::Result<Vec<R>, E>>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = std::result::Result<R, E>>,
{
    let executor = BoundedMapExecutor::new(ExecutorConfig::from_option(concurrency)?);
    Ok(async move { executor.map(items, transform).await })
}
