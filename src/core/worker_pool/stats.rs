//! Pool utilization counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Configured number of worker threads.
    pub worker_count: usize,
    /// Jobs submitted but not yet finished.
    pub pending_jobs: usize,
    /// Jobs executing right now.
    pub active_jobs: u64,
    /// Jobs accepted by `add_job`.
    pub submitted_jobs: u64,
    /// Jobs that finished, successfully or not.
    pub completed_jobs: u64,
    /// Finished jobs whose execute step returned an error or panicked.
    pub failed_jobs: u64,
    /// Jobs rejected after shutdown or discarded on cancellation.
    pub dropped_jobs: u64,
}

/// Internal counters (lock-free atomics).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub active_jobs: AtomicU64,
    pub submitted_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub failed_jobs: AtomicU64,
    pub dropped_jobs: AtomicU64,
}

impl PoolCounters {
    pub fn snapshot(&self, worker_count: usize, pending_jobs: usize) -> PoolStats {
        PoolStats {
            worker_count,
            pending_jobs,
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.failed_jobs.load(Ordering::Relaxed),
            dropped_jobs: self.dropped_jobs.load(Ordering::Relaxed),
        }
    }
}
