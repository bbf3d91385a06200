//! Configuration models for worker pools.

pub mod pool;

pub use pool::{PoolConfig, ENV_QUEUE_CAPACITY, ENV_THREAD_PREFIX, ENV_WORKER_COUNT};
