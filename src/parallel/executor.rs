//! Bounded executor core
//!
//! Drives a lazily produced sequence of futures with at most `concurrency`
//! of them in flight, writing each output into the slot of its original
//! index. Futures are polled on the caller's task; nothing is spawned.

use super::config::{AdmissionMode, ExecutorConfig};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Fixed-size result buffer, one slot per input position
struct Slots<T> {
    slots: Vec<Option<T>>,
}

impl<T> Slots<T> {
    fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    fn write(&mut self, index: usize, value: T) {
        debug_assert!(self.slots[index].is_none(), "slot {index} written twice");
        self.slots[index] = Some(value);
    }

    fn into_vec(self) -> Vec<T> {
        let len = self.slots.len();
        let values: Vec<T> = self.slots.into_iter().flatten().collect();
        debug_assert_eq!(values.len(), len, "unfilled result slot");
        values
    }
}

/// Run `jobs` under `config`, preserving input order in the output
///
/// `jobs` is pulled only when an item is admitted, so any synchronous work a
/// job constructor does happens at dispatch time, in index order.
///
/// On failure no further jobs are admitted; jobs already in flight are driven
/// to completion and their outputs discarded. The error returned is the first
/// one to settle.
pub(crate) async fn drive<I, Fut, T, E>(jobs: I, config: &ExecutorConfig) -> Result<Vec<T>, E>
where
    I: ExactSizeIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    let total = jobs.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let limit = config.concurrency();
    tracing::debug!(
        total,
        concurrency = limit,
        mode = %config.mode(),
        "starting bounded execution"
    );

    let slots = Slots::new(total);
    match config.mode() {
        AdmissionMode::Chunked => drive_chunked(jobs, limit, slots).await,
        AdmissionMode::Window => drive_window(jobs, limit, slots).await,
    }
}

async fn drive_chunked<I, Fut, T, E>(
    jobs: I,
    limit: usize,
    mut slots: Slots<T>,
) -> Result<Vec<T>, E>
where
    I: Iterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    let mut jobs = jobs.enumerate();
    let mut chunk_start = 0usize;

    loop {
        let mut chunk: FuturesUnordered<_> = jobs
            .by_ref()
            .take(limit)
            .map(|(index, job)| async move { (index, job.await) })
            .collect();
        if chunk.is_empty() {
            break;
        }

        let chunk_len = chunk.len();
        tracing::debug!(start = chunk_start, len = chunk_len, "dispatched chunk");

        let mut failure = None;
        while let Some((index, outcome)) = chunk.next().await {
            match outcome {
                Ok(value) => slots.write(index, value),
                Err(err) => {
                    if failure.is_none() {
                        tracing::debug!(index, "item failed, draining chunk");
                        failure = Some(err);
                    }
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }
        chunk_start += chunk_len;
    }

    Ok(slots.into_vec())
}

async fn drive_window<I, Fut, T, E>(
    jobs: I,
    limit: usize,
    mut slots: Slots<T>,
) -> Result<Vec<T>, E>
where
    I: Iterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    let mut jobs = jobs.enumerate();
    let mut in_flight = FuturesUnordered::new();
    let mut failure = None;

    loop {
        if failure.is_none() {
            while in_flight.len() < limit {
                match jobs.next() {
                    Some((index, job)) => in_flight.push(async move { (index, job.await) }),
                    None => break,
                }
            }
        }

        match in_flight.next().await {
            Some((index, Ok(value))) => slots.write(index, value),
            Some((index, Err(err))) => {
                if failure.is_none() {
                    tracing::debug!(
                        index,
                        in_flight = in_flight.len(),
                        "item failed, closing window"
                    );
                    failure = Some(err);
                }
            }
            None => break,
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(slots.into_vec()),
    }
}
