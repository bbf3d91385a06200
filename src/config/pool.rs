//! Worker pool configuration.

use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Environment variable holding the worker count.
pub const ENV_WORKER_COUNT: &str = "WORKER_POOL_WORKER_COUNT";
/// Environment variable holding the job/result queue capacity.
pub const ENV_QUEUE_CAPACITY: &str = "WORKER_POOL_QUEUE_CAPACITY";
/// Environment variable holding the worker thread name prefix.
pub const ENV_THREAD_PREFIX: &str = "WORKER_POOL_THREAD_PREFIX";

const DEFAULT_THREAD_PREFIX: &str = "pool-worker";

/// Settings for a [`WorkerPool`](crate::core::WorkerPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of worker threads, fixed for the pool's lifetime.
    pub worker_count: usize,
    /// Capacity of both the job queue and the result queue. Zero means
    /// every hand-off is synchronous.
    pub queue_capacity: usize,
    /// Worker threads are named `{prefix}-{n}`.
    pub thread_name_prefix: String,
    /// Optional stack size for worker threads, in bytes.
    pub thread_stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let worker_count = num_cpus::get();
        Self {
            worker_count,
            queue_capacity: worker_count * 2,
            thread_name_prefix: DEFAULT_THREAD_PREFIX.into(),
            thread_stack_size: None,
        }
    }
}

/// Untyped form used at parsing boundaries so negative numbers are reported
/// as configuration errors instead of generic parse failures.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPoolConfig {
    worker_count: Option<i64>,
    queue_capacity: Option<i64>,
    thread_name_prefix: Option<String>,
    thread_stack_size: Option<usize>,
}

impl TryFrom<RawPoolConfig> for PoolConfig {
    type Error = ConfigError;

    fn try_from(raw: RawPoolConfig) -> Result<Self, Self::Error> {
        let mut cfg = Self::default();
        if let Some(workers) = raw.worker_count {
            cfg.worker_count = match workers {
                n if n < 0 => return Err(ConfigError::NegativeWorkers(n)),
                n => usize::try_from(n).map_err(|_| ConfigError::InvalidValue {
                    key: "worker_count".into(),
                    value: n.to_string(),
                })?,
            };
        }
        cfg.queue_capacity = match raw.queue_capacity {
            Some(n) if n < 0 => return Err(ConfigError::NegativeQueueCapacity(n)),
            Some(n) => usize::try_from(n).map_err(|_| ConfigError::InvalidValue {
                key: "queue_capacity".into(),
                value: n.to_string(),
            })?,
            // Default capacity follows the configured worker count.
            None => cfg.worker_count.saturating_mul(2),
        };
        if let Some(prefix) = raw.thread_name_prefix {
            cfg.thread_name_prefix = prefix;
        }
        cfg.thread_stack_size = raw.thread_stack_size;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl PoolConfig {
    /// Defaults from [`PoolConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the job/result queue capacity.
    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = Some(bytes);
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWorkers`] when `worker_count` is zero and
    /// [`ConfigError::InvalidValue`] for an empty thread name prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.thread_name_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "thread_name_prefix".into(),
                value: self.thread_name_prefix.clone(),
            });
        }
        Ok(())
    }

    /// Parse configuration from a JSON object and validate it. Missing
    /// fields keep their defaults; a missing `queue_capacity` is twice the
    /// resulting `worker_count`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the matching
    /// variant for negative or zero sizes.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let raw: RawPoolConfig =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Read configuration from the process environment, loading a `.env`
    /// file first if one exists.
    ///
    /// # Errors
    ///
    /// See [`PoolConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; real env vars still apply.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup using the
    /// `WORKER_POOL_*` keys. Unset keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for non-numeric sizes, or the
    /// same errors as [`PoolConfig::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |key: &str| -> Result<Option<i64>, ConfigError> {
            lookup(key)
                .map(|value| {
                    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value,
                    })
                })
                .transpose()
        };

        let raw = RawPoolConfig {
            worker_count: parse(ENV_WORKER_COUNT)?,
            queue_capacity: parse(ENV_QUEUE_CAPACITY)?,
            thread_name_prefix: lookup(ENV_THREAD_PREFIX),
            thread_stack_size: None,
        };
        Self::try_from(raw)
    }
}
