//! One-shot broadcast signals.
//!
//! Both signals are built on a [`Latch`]: a channel nobody ever sends on.
//! Firing the latch drops the only sender, which disconnects the channel and
//! wakes every receiver at once, including receivers parked inside
//! `crossbeam_channel::select!`. That lets a worker wait on its job queue,
//! the pool's shutdown signal and an external cancellation token in one
//! blocking call.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, never, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

/// Fire-once broadcast primitive.
#[derive(Debug)]
pub(crate) struct Latch {
    trigger: Mutex<Option<Sender<Infallible>>>,
    signal: Receiver<Infallible>,
}

impl Latch {
    pub(crate) fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            trigger: Mutex::new(Some(trigger)),
            signal,
        }
    }

    /// Latch that can never fire.
    fn inert() -> Self {
        Self {
            trigger: Mutex::new(None),
            signal: never(),
        }
    }

    /// Fire the latch. Returns `true` for the call that actually fired it.
    pub(crate) fn fire(&self) -> bool {
        self.trigger.lock().take().is_some()
    }

    pub(crate) fn is_fired(&self) -> bool {
        // A `never()` receiver reports empty, not disconnected.
        matches!(
            self.signal.try_recv(),
            Err(crossbeam_channel::TryRecvError::Disconnected)
        )
    }

    pub(crate) fn wait(&self) {
        // Only returns once the sender is gone.
        let _ = self.signal.recv();
    }

    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(
            self.signal.recv_timeout(timeout),
            Err(RecvTimeoutError::Disconnected)
        )
    }

    pub(crate) const fn receiver(&self) -> &Receiver<Infallible> {
        &self.signal
    }
}

/// Cooperative cancellation handed to [`WorkerPool::start`](crate::core::WorkerPool::start).
///
/// Clones share state: cancelling any clone cancels them all. Workers watch
/// the token while waiting for work and exit once it fires, leaving queued
/// jobs unexecuted. A job that is already running is never interrupted.
///
/// ```
/// use bounded_worker_pool::core::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    latch: Arc<Latch>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latch: Arc::new(Latch::new()),
        }
    }

    /// A token that can never be cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self {
            latch: Arc::new(Latch::inert()),
        }
    }

    /// Request cancellation. Later calls are no-ops.
    pub fn cancel(&self) {
        self.latch.fire();
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.latch.is_fired()
    }

    /// Block until the token is cancelled.
    pub fn wait(&self) {
        self.latch.wait();
    }

    /// Block until the token is cancelled or `timeout` elapses. Returns
    /// `true` if cancelled.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.latch.wait_timeout(timeout)
    }

    /// Receiver that becomes ready (disconnected) on cancellation, for use
    /// with `crossbeam_channel::select!`.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<Infallible> {
        self.latch.receiver()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle on a pool's shutdown signal, returned by
/// [`WorkerPool::done`](crate::core::WorkerPool::done).
///
/// Fires exactly once, when `stop` completes.
#[derive(Debug, Clone)]
pub struct Done {
    latch: Arc<Latch>,
}

impl Done {
    pub(crate) const fn new(latch: Arc<Latch>) -> Self {
        Self { latch }
    }

    /// Whether the pool has finished stopping.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.latch.is_fired()
    }

    /// Block until the pool has stopped.
    pub fn wait(&self) {
        self.latch.wait();
    }

    /// Block until the pool has stopped or `timeout` elapses. Returns `true`
    /// if the pool stopped.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.latch.wait_timeout(timeout)
    }

    /// Receiver that becomes ready once the pool stops.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<Infallible> {
        self.latch.receiver()
    }

    /// Wait for the pool to stop without blocking the async runtime.
    #[cfg(feature = "tokio-runtime")]
    pub async fn wait_async(&self) {
        let latch = Arc::clone(&self.latch);
        // Blocking wait moved onto tokio's blocking pool.
        let _ = tokio::task::spawn_blocking(move || latch.wait()).await;
    }
}
