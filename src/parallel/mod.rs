//! Bounded-concurrency execution
//!
//! Provides an async map and a parallel task runner that never keep more
//! than a configured number of futures in flight and always return results
//! in input order.

mod config;
mod executor;
mod map;
mod tasks;

pub use config::{AdmissionMode, ExecutorConfig, DEFAULT_CONCURRENCY};
pub use map::{map_bounded, BoundedMapExecutor};
pub use tasks::{run_bounded, task, BoundedParallelExecutor, Task};
