//! Counting barrier for submitted-but-unfinished jobs.

use parking_lot::{Condvar, Mutex};

/// Pending job counter with a blocking wait for zero.
///
/// Waiters sleep on a `Condvar` and are woken when the count drops to zero.
#[derive(Debug, Default)]
pub(crate) struct PendingJobs {
    count: Mutex<usize>,
    zero: Condvar,
}

impl PendingJobs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self) {
        *self.count.lock() += 1;
    }

    /// Mark one job finished. Never goes below zero.
    pub(crate) fn done(&self) {
        let mut count = self.count.lock();
        debug_assert!(*count > 0, "pending job count underflow");
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.zero.notify_all();
        }
    }

    pub(crate) fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Block until the count is zero.
    pub(crate) fn wait_until_zero(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.zero.wait(&mut count);
        }
    }
}
