//! Error types for pool construction and job execution.

use thiserror::Error;

/// Configuration problems detected before a pool is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A pool cannot run without workers.
    #[error("worker_count must be greater than zero")]
    ZeroWorkers,
    /// Worker count parsed from external input was negative.
    #[error("worker_count must be greater than zero (got {0})")]
    NegativeWorkers(i64),
    /// Queue capacity parsed from external input was negative.
    #[error("queue_capacity cannot be negative (got {0})")]
    NegativeQueueCapacity(i64),
    /// Input could not be parsed at all.
    #[error("parse error: {0}")]
    Parse(String),
    /// A single setting had an unusable value.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Raw value as supplied.
        value: String,
    },
}

/// Errors returned by [`WorkerPool`](crate::core::WorkerPool).
///
/// Construction is the only fallible pool operation; job failures never
/// surface here.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Error produced by a job's execute step.
pub type JobError = anyhow::Error;

/// Result alias for job closures and other caller-facing code.
pub type AppResult<T> = Result<T, anyhow::Error>;
