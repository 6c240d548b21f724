//! Property-based tests for the bounded executors
//!
//! These tests use proptest to generate random inputs, limits and per-item
//! delays and verify that:
//! 1. The output has one entry per input
//! 2. `result[i]` always belongs to `input[i]`, whatever the completion order
//! 3. The number of in-flight items never exceeds the limit

use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taskbatch::{AdmissionMode, BoundedMapExecutor, ExecutorConfig};

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Items paired with a per-item delay in milliseconds
fn items_with_delays() -> impl Strategy<Value = Vec<(i64, u64)>> {
    prop::collection::vec((any::<i64>(), 0u64..50), 0..40)
}

fn admission_mode() -> impl Strategy<Value = AdmissionMode> {
    prop_oneof![Just(AdmissionMode::Chunked), Just(AdmissionMode::Window)]
}

/// Paused-clock runtime, so random delays cost no wall time
fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_order_length_and_bound_hold(
        items in items_with_delays(),
        concurrency in 1i64..8,
        mode in admission_mode(),
    ) {
        let config = ExecutorConfig::new(concurrency).unwrap().with_mode(mode);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let results = runtime().block_on(async {
            BoundedMapExecutor::new(config)
                .map(items.clone(), |(value, delay), index| {
                    let active = &active;
                    let peak = &peak;
                    async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, String>((index, value.wrapping_mul(3)))
                    }
                })
                .await
        });

        let results = results.unwrap();
        prop_assert_eq!(results.len(), items.len());
        for (i, (index, value)) in results.iter().enumerate() {
            prop_assert_eq!(*index, i);
            prop_assert_eq!(*value, items[i].0.wrapping_mul(3));
        }
        prop_assert!(peak.load(Ordering::SeqCst) <= concurrency as usize);
    }

    #[test]
    fn prop_failure_surfaces_an_error(
        len in 1usize..30,
        failing in any::<prop::sample::Index>(),
        concurrency in 1i64..6,
    ) {
        let failing = failing.index(len);
        let executor = BoundedMapExecutor::with_concurrency(concurrency).unwrap();

        let result = runtime().block_on(executor.map(0..len, |n, _| async move {
            if n == failing {
                Err(format!("item {n}"))
            } else {
                Ok(n)
            }
        }));

        prop_assert_eq!(result, Err(format!("item {failing}")));
    }

    #[test]
    fn prop_invalid_concurrency_rejected(concurrency in i64::MIN..1) {
        let err = ExecutorConfig::new(concurrency).unwrap_err();
        prop_assert!(err.to_string().contains("must be at least 1"));
    }
}
