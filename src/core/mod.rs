//! Pool and job abstractions.

pub mod error;
pub mod job;
mod pending;
pub mod signal;
pub mod worker_pool;

pub use error::{AppResult, ConfigError, JobError, PoolError};
pub use job::{
    new_job, new_job_with_outcome, new_job_with_result, ClosureJob, Job, JobOutcome, JobResult,
};
pub use signal::{CancellationToken, Done};
pub use worker_pool::{PoolStats, WorkerPool};
