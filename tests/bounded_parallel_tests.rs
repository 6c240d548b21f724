//! Integration tests for bounded execution of task thunks

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use taskbatch::{
    run_bounded, task, AdmissionMode, BoundedParallelExecutor, Error, ExecutorConfig, Task,
};
use tokio::time::sleep;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Build a task that sleeps, tracks concurrency and returns `value`
fn tracked(
    active: &Arc<AtomicUsize>,
    peak: &Arc<AtomicUsize>,
    delay: u64,
    value: usize,
) -> Task<'static, usize, String> {
    let active = Arc::clone(active);
    let peak = Arc::clone(peak);
    task(move || async move {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        sleep(ms(delay)).await;
        active.fetch_sub(1, Ordering::SeqCst);
        Ok(value)
    })
}

#[tokio::test(start_paused = true)]
async fn test_results_follow_task_order() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let delays = [40u64, 5, 30, 15, 25, 10, 35];
    let tasks: Vec<_> = delays
        .iter()
        .enumerate()
        .map(|(i, d)| tracked(&active, &peak, *d, i * 100))
        .collect();

    let results = BoundedParallelExecutor::with_concurrency(3)
        .unwrap()
        .run(tasks)
        .await
        .unwrap();

    assert_eq!(results, vec![0, 100, 200, 300, 400, 500, 600]);
    assert!(peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test(start_paused = true)]
async fn test_six_tasks_concurrency_three() {
    for mode in [AdmissionMode::Chunked, AdmissionMode::Window] {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..6).map(|i| tracked(&active, &peak, 10, i)).collect();

        let config = ExecutorConfig::new(3).unwrap().with_mode(mode);
        let results = BoundedParallelExecutor::new(config)
            .run(tasks)
            .await
            .unwrap();

        assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(peak.load(Ordering::SeqCst), 3, "{mode}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_default_concurrency_is_five() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<_> = (0..12).map(|i| tracked(&active, &peak, 10, i)).collect();

    let results = run_bounded(tasks, None).unwrap().await.unwrap();

    assert_eq!(results.len(), 12);
    assert_eq!(peak.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn test_empty_task_list() {
    let tasks: Vec<Task<'static, usize, String>> = Vec::new();
    let results = BoundedParallelExecutor::default().run(tasks).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_plain_closures_without_boxing() {
    let tasks = (1..=4u8).map(|n| move || async move { Ok::<_, String>(u32::from(n) * 3) });
    let tasks: Vec<_> = tasks.collect();
    let results = BoundedParallelExecutor::with_concurrency(2)
        .unwrap()
        .run(tasks)
        .await
        .unwrap();
    assert_eq!(results, vec![3, 6, 9, 12]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_propagates_and_later_chunks_never_start() {
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<Task<'static, usize, anyhow::Error>> = (0..6)
        .map(|i| {
            let started = Arc::clone(&started);
            let finished = Arc::clone(&finished);
            task(move || async move {
                started.fetch_add(1, Ordering::SeqCst);
                if i == 1 {
                    anyhow::bail!("task {i} exploded");
                }
                sleep(ms(20)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(i)
            })
        })
        .collect();

    let err = BoundedParallelExecutor::with_concurrency(3)
        .unwrap()
        .run(tasks)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "task 1 exploded");
    assert_eq!(started.load(Ordering::SeqCst), 3);
    // tasks 0 and 2 were already running and were not cancelled
    assert_eq!(finished.load(Ordering::SeqCst), 2);
}

#[test]
fn test_invalid_concurrency_rejected_before_any_task_runs() {
    let ran = Arc::new(AtomicUsize::new(0));
    let tasks: Vec<Task<'static, (), String>> = (0..3)
        .map(|_| {
            let ran = Arc::clone(&ran);
            task(move || async move {
                ran.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .collect();

    let err = run_bounded(tasks, Some(0)).err();
    assert_eq!(err, Some(Error::InvalidConcurrency { value: 0 }));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}
