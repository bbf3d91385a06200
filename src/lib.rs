//! # Bounded Worker Pool
//!
//! A fixed-size pool of worker threads for running many independent,
//! possibly fallible jobs (outbound network calls, file processing, ...) with
//! controlled parallelism and backpressure.
//!
//! ## Key Features
//!
//! - **Fixed parallelism**: `worker_count` OS threads, set at construction
//! - **Bounded queues**: submitting blocks when the job queue is full
//! - **Optional results**: result-wanting jobs publish a [`JobResult`] stream
//! - **Idempotent lifecycle**: `start` and `stop` take effect at most once
//! - **Graceful or abrupt**: `stop` drains pending work; a
//!   [`CancellationToken`] stops workers without draining
//!
//! ## Example
//!
//! ```rust
//! use std::thread;
//! use bounded_worker_pool::{new_job_with_result, CancellationToken, WorkerPool};
//!
//! let pool = WorkerPool::<u64>::new(4, 16)?;
//! pool.start(CancellationToken::never());
//!
//! let results = pool.results();
//! let consumer = thread::spawn(move || results.iter().filter(|r| r.is_ok()).count());
//!
//! let job = new_job_with_result(|| Ok(42_u64), |err| eprintln!("job failed: {err}"));
//! for _ in 0..100 {
//!     pool.add_job(job.clone());
//! }
//!
//! pool.stop();
//! assert_eq!(consumer.join().unwrap(), 100);
//! # Ok::<(), bounded_worker_pool::PoolError>(())
//! ```
//!
//! See `demos/simulated_requests.rs` for a caller that drains results while
//! submitting.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Configuration models for worker pools.
pub mod config;
/// Pool, job and signal abstractions.
pub mod core;
/// Shared utilities.
pub mod util;

pub use crate::config::PoolConfig;
pub use crate::core::{
    new_job, new_job_with_outcome, new_job_with_result, AppResult, CancellationToken, ClosureJob,
    ConfigError, Done, Job, JobError, JobOutcome, JobResult, PoolError, PoolStats, WorkerPool,
};
