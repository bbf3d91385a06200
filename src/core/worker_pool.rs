//! Fixed-size worker pool with bounded job and result queues.
//!
//! `WorkerPool` owns `worker_count` OS threads that pull jobs from a single
//! shared bounded queue. Submitting blocks when the queue is full, so the
//! queue capacity is the backpressure knob. Result-wanting jobs publish a
//! [`JobResult`] onto a second bounded queue of the same capacity.
//!
//! # Lifecycle
//!
//! - `new` validates and allocates both queues; no threads yet.
//! - `start` spawns the workers exactly once, whatever the number of callers.
//! - `add_job` counts the job as pending and enqueues it. After shutdown (or
//!   cancellation) the job is silently dropped.
//! - `wait_jobs` blocks until nothing is pending.
//! - `stop` drains pending work, closes both queues and fires [`Done`].
//!
//! # Example
//!
//! ```
//! use bounded_worker_pool::core::{new_job_with_result, CancellationToken, WorkerPool};
//!
//! let pool = WorkerPool::<String>::new(4, 8)?;
//! pool.start(CancellationToken::never());
//! let results = pool.results();
//!
//! let job = new_job_with_result(|| Ok("pong".to_string()), |err| eprintln!("{err}"));
//! for _ in 0..3 {
//!     pool.add_job(job.clone());
//! }
//!
//! pool.wait_jobs();
//! pool.stop();
//!
//! let values: Vec<String> = results.iter().filter_map(|r| r.value().cloned()).collect();
//! assert_eq!(values, vec!["pong"; 3]);
//! assert!(pool.done().is_done());
//! # Ok::<(), bounded_worker_pool::core::PoolError>(())
//! ```

mod stats;
mod worker;

use std::sync::atomic::Ordering;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, never, select, Receiver, Sender};
use parking_lot::{Mutex, Once};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PoolConfig;
use crate::core::error::PoolError;
use crate::core::job::{Job, JobResult};
use crate::core::pending::PendingJobs;
use crate::core::signal::{CancellationToken, Done, Latch};

pub use stats::PoolStats;
use stats::PoolCounters;

/// State shared between the pool handle and its workers.
pub(crate) struct Shared<T> {
    id: Uuid,
    /// `None` once the job queue has been closed.
    job_tx: Mutex<Option<Sender<Arc<dyn Job<T>>>>>,
    job_rx: Receiver<Arc<dyn Job<T>>>,
    /// `None` once the result queue has been closed.
    result_tx: Mutex<Option<Sender<JobResult<T>>>>,
    result_rx: Receiver<JobResult<T>>,
    pending: PendingJobs,
    counters: PoolCounters,
    shutdown: Arc<Latch>,
    /// Fires once the start token is in `cancel`.
    started: Latch,
    cancel: OnceLock<CancellationToken>,
}

impl<T> Shared<T> {
    fn new(queue_capacity: usize) -> Self {
        let (job_tx, job_rx) = bounded(queue_capacity);
        let (result_tx, result_rx) = bounded(queue_capacity);
        Self {
            id: Uuid::new_v4(),
            job_tx: Mutex::new(Some(job_tx)),
            job_rx,
            result_tx: Mutex::new(Some(result_tx)),
            result_rx,
            pending: PendingJobs::new(),
            counters: PoolCounters::default(),
            shutdown: Arc::new(Latch::new()),
            started: Latch::new(),
            cancel: OnceLock::new(),
        }
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel
            .get()
            .cloned()
            .unwrap_or_else(CancellationToken::never)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.get().is_some_and(CancellationToken::is_cancelled)
    }

    fn wait_jobs(&self) {
        self.pending.wait_until_zero();
    }

    /// Drop every job still queued, releasing its pending slot. Returns the
    /// number of jobs discarded.
    fn discard_queued(&self) -> u64 {
        let mut discarded = 0_u64;
        while self.job_rx.try_recv().is_ok() {
            self.pending.done();
            discarded += 1;
        }
        if discarded > 0 {
            self.counters
                .dropped_jobs
                .fetch_add(discarded, Ordering::Relaxed);
            warn!(
                pool_id = %self.id,
                discarded = discarded,
                "Discarded queued jobs after cancellation"
            );
        }
        discarded
    }

    /// Hand a result to consumers. Gives up if the pool shuts down while the
    /// result queue is full.
    fn publish(&self, result: JobResult<T>) {
        let Some(result_tx) = self.result_tx.lock().clone() else {
            warn!(pool_id = %self.id, "Result queue closed, dropping result");
            return;
        };
        select! {
            send(result_tx, result) -> sent => {
                if sent.is_err() {
                    warn!(pool_id = %self.id, "Result queue disconnected, dropping result");
                }
            },
            recv(self.shutdown.receiver()) -> _ => {
                debug!(pool_id = %self.id, "Pool shut down before result was published");
            },
        }
    }

    /// Close both queues and fire the shutdown signal.
    fn close(&self) {
        self.job_tx.lock().take();
        self.result_tx.lock().take();
        self.shutdown.fire();
    }
}

/// Bounded pool of worker threads.
///
/// `T` is the value type produced by result-wanting jobs. All methods take
/// `&self`, so the pool can be shared across threads behind an `Arc`.
pub struct WorkerPool<T>
where
    T: Send + 'static,
{
    config: PoolConfig,
    shared: Arc<Shared<T>>,
    started: Once,
    stopped: Once,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T> WorkerPool<T>
where
    T: Send + 'static,
{
    /// Create a pool with `worker_count` workers and queues of
    /// `queue_capacity` slots. A capacity of zero makes every hand-off
    /// synchronous. No threads are spawned until [`WorkerPool::start`].
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` when `worker_count` is zero.
    pub fn new(worker_count: usize, queue_capacity: usize) -> Result<Self, PoolError> {
        Self::with_config(
            PoolConfig::new()
                .with_worker_count(worker_count)
                .with_queue_capacity(queue_capacity),
        )
    }

    /// Create a pool from a full [`PoolConfig`].
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidConfig` if the configuration is invalid.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let shared = Arc::new(Shared::new(config.queue_capacity));

        info!(
            pool_id = %shared.id,
            worker_count = config.worker_count,
            queue_capacity = config.queue_capacity,
            "WorkerPool initialized"
        );

        Ok(Self {
            config,
            shared,
            started: Once::new(),
            stopped: Once::new(),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the worker threads. Only the first call has any effect, even
    /// under concurrent invocation; the token passed with it is the one the
    /// workers watch. Does not block.
    pub fn start(&self, cancel: CancellationToken) {
        self.started.call_once(|| {
            // Set before any worker exists, so every worker sees it.
            let _ = self.shared.cancel.set(cancel);
            self.shared.started.fire();

            let mut workers = self.workers.lock();
            for worker_id in 1..=self.config.worker_count {
                match worker::spawn_worker(worker_id, Arc::clone(&self.shared), &self.config) {
                    Ok(handle) => workers.push(handle),
                    Err(e) => {
                        error!(
                            worker_id = worker_id,
                            error = %e,
                            "Failed to spawn worker thread"
                        );
                    }
                }
            }

            info!(
                pool_id = %self.shared.id,
                worker_count = workers.len(),
                "WorkerPool started"
            );
        });
    }

    /// Submit a job.
    ///
    /// Blocks while the job queue is full. If the pool has shut down, or its
    /// start token was cancelled, the job is dropped without being executed
    /// or counted. A submitter blocked before [`WorkerPool::start`] is also
    /// released when the token later passed to `start` is cancelled.
    pub fn add_job(&self, job: Arc<dyn Job<T>>) {
        if self.shared.shutdown.is_fired() || self.shared.is_cancelled() {
            self.drop_job("pool is not accepting jobs");
            return;
        }

        // Counting under the sender lock orders this against `stop` closing
        // the queue: either the job is counted before the close, or it is
        // rejected.
        let job_tx = self.shared.job_tx.lock().as_ref().map(|job_tx| {
            self.shared.pending.add();
            job_tx.clone()
        });
        let Some(job_tx) = job_tx else {
            self.drop_job("job queue closed");
            return;
        };
        self.shared
            .counters
            .submitted_jobs
            .fetch_add(1, Ordering::Relaxed);

        let sent = loop {
            // Before start there is no token yet; wake up when it arrives.
            let armed = self.shared.cancel.get().is_some();
            let cancel = self.shared.cancel_token();
            let started = if armed {
                never()
            } else {
                self.shared.started.receiver().clone()
            };

            let sent = select! {
                send(job_tx, Arc::clone(&job)) -> sent => Some(sent.is_ok()),
                recv(cancel.receiver()) -> _ => Some(false),
                recv(started) -> _ => None,
            };
            if let Some(sent) = sent {
                break sent;
            }
        };

        if !sent {
            self.shared.pending.done();
            self.drop_job("pool cancelled while job was waiting for a slot");
        } else if self.shared.is_cancelled() {
            // Workers may already have drained the queue and exited.
            self.shared.discard_queued();
        }
    }

    /// Block until every submitted job has finished. After cancellation,
    /// jobs still queued count as finished once they are discarded; a job
    /// already running is waited for.
    ///
    /// Does not imply the pool has stopped.
    pub fn wait_jobs(&self) {
        self.shared.wait_jobs();
    }

    /// Async variant of [`WorkerPool::wait_jobs`]; the blocking wait runs on
    /// tokio's blocking thread pool.
    #[cfg(feature = "tokio-runtime")]
    pub async fn wait_jobs_async(&self) {
        let shared = Arc::clone(&self.shared);
        let _ = tokio::task::spawn_blocking(move || shared.wait_jobs()).await;
    }

    /// Shut the pool down gracefully. Only the first call has any effect.
    ///
    /// Waits for pending jobs, closes the job queue, closes the result queue
    /// (readers then see the end of the stream), fires [`Done`] and joins
    /// the worker threads.
    pub fn stop(&self) {
        self.stopped.call_once(|| {
            info!(pool_id = %self.shared.id, "Stopping worker pool");

            self.shared.wait_jobs();
            self.shared.job_tx.lock().take();
            // Jobs counted between the first wait and the close.
            self.shared.wait_jobs();
            self.shared.close();

            self.join_workers();
            info!(pool_id = %self.shared.id, "Worker pool stopped");
        });
    }

    /// Stream of results from result-wanting jobs. Reads block while the
    /// queue is empty and end once [`WorkerPool::stop`] has closed it.
    /// Multiple receivers share one stream; each result is delivered once.
    #[must_use]
    pub fn results(&self) -> Receiver<JobResult<T>> {
        self.shared.result_rx.clone()
    }

    /// One-shot signal that fires when [`WorkerPool::stop`] completes.
    #[must_use]
    pub fn done(&self) -> Done {
        Done::new(Arc::clone(&self.shared.shutdown))
    }

    /// Current utilization counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.shared
            .counters
            .snapshot(self.config.worker_count, self.shared.pending.count())
    }

    /// Whether [`WorkerPool::start`] has run.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.state().done()
    }

    /// Whether the shutdown signal has fired.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.shutdown.is_fired()
    }

    /// Configured worker count.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    /// Capacity of the job and result queues.
    #[must_use]
    pub const fn queue_capacity(&self) -> usize {
        self.config.queue_capacity
    }

    /// Pool configuration.
    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Identifier used in this pool's log events.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    fn drop_job(&self, reason: &'static str) {
        self.shared
            .counters
            .dropped_jobs
            .fetch_add(1, Ordering::Relaxed);
        debug!(pool_id = %self.shared.id, reason = reason, "Dropping submitted job");
    }

    fn join_workers(&self) {
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for (idx, worker) in workers.into_iter().enumerate() {
            match worker.join() {
                Ok(()) => debug!(worker_id = idx + 1, "Worker joined"),
                Err(_) => warn!(worker_id = idx + 1, "Worker panicked"),
            }
        }
    }
}

impl<T> Drop for WorkerPool<T>
where
    T: Send + 'static,
{
    fn drop(&mut self) {
        // Signal shutdown but don't wait: an explicit `stop` is required for
        // graceful draining.
        self.stopped.call_once(|| {
            self.shared.close();
            debug!(
                pool_id = %self.shared.id,
                "WorkerPool dropped without explicit stop - workers will be detached"
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::{new_job, new_job_with_outcome, new_job_with_result, JobOutcome};
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_workers_rejected() {
        let err = WorkerPool::<()>::new(0, 20).err().unwrap();
        assert!(matches!(
            err,
            PoolError::InvalidConfig(crate::core::ConfigError::ZeroWorkers)
        ));
    }

    #[test]
    fn test_new_does_not_start() {
        let pool = WorkerPool::<()>::new(2, 4).unwrap();
        assert!(!pool.is_started());
        assert!(!pool.is_stopped());
        assert_eq!(pool.worker_count(), 2);
        assert_eq!(pool.queue_capacity(), 4);
        assert!(pool.workers.lock().is_empty());
    }

    #[test]
    fn test_start_spawns_once() {
        let pool = WorkerPool::<()>::new(3, 4).unwrap();
        pool.start(CancellationToken::never());
        pool.start(CancellationToken::never());
        assert!(pool.is_started());
        assert_eq!(pool.workers.lock().len(), 3);
        pool.stop();
        assert!(pool.workers.lock().is_empty());
    }

    #[test]
    fn test_runs_jobs_and_counts_stats() {
        let pool = WorkerPool::<u32>::new(2, 2).unwrap();
        pool.start(CancellationToken::never());

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let job = new_job::<u32, _, _>(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            |_| {},
        );
        for _ in 0..10 {
            pool.add_job(job.clone());
        }
        pool.wait_jobs();

        assert_eq!(runs.load(Ordering::SeqCst), 10);
        let stats = pool.stats();
        assert_eq!(stats.submitted_jobs, 10);
        assert_eq!(stats.completed_jobs, 10);
        assert_eq!(stats.pending_jobs, 0);
        assert_eq!(stats.active_jobs, 0);
        pool.stop();
    }

    #[test]
    fn test_panicking_job_becomes_error() {
        let pool = WorkerPool::<u32>::new(1, 1).unwrap();
        pool.start(CancellationToken::never());
        let results = pool.results();

        pool.add_job(new_job_with_result(
            || -> crate::core::AppResult<u32> { panic!("kaboom") },
            |_| {},
        ));
        pool.wait_jobs();

        let result = results.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(result.error().unwrap().to_string(), "job panicked: kaboom");
        assert_eq!(pool.stats().failed_jobs, 1);
        pool.stop();
    }

    #[test]
    fn test_result_carries_value_and_error() {
        let pool = WorkerPool::<u32>::new(1, 1).unwrap();
        pool.start(CancellationToken::never());
        let results = pool.results();

        pool.add_job(new_job_with_outcome(
            || JobOutcome::partial(41, anyhow::anyhow!("late")),
            |_| {},
        ));
        pool.wait_jobs();

        let result = results.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(result.value(), Some(&41));
        assert_eq!(result.error().unwrap().to_string(), "late");
        assert_eq!(pool.stats().failed_jobs, 1);
        pool.stop();
    }

    #[test]
    fn test_drop_without_stop_fires_done() {
        let pool = WorkerPool::<()>::new(2, 0).unwrap();
        pool.start(CancellationToken::never());
        let done = pool.done();
        drop(pool);
        assert!(done.wait_timeout(Duration::from_secs(1)));
    }

    #[test]
    fn test_cancel_while_blocked_on_full_queue() {
        // One worker, busy; capacity one; third submission blocks.
        let pool = Arc::new(WorkerPool::<()>::new(1, 1).unwrap());
        let token = CancellationToken::new();
        pool.start(token.clone());

        let slow = new_job::<(), _, _>(
            || {
                thread::sleep(Duration::from_millis(100));
                Ok(())
            },
            |_| {},
        );
        pool.add_job(slow.clone());
        pool.add_job(slow.clone());

        let submitter = {
            let pool = Arc::clone(&pool);
            let slow = slow.clone();
            thread::spawn(move || pool.add_job(slow))
        };

        thread::sleep(Duration::from_millis(20));
        token.cancel();
        submitter.join().unwrap();
        pool.wait_jobs();
        pool.stop();
        assert!(pool.is_stopped());

        // The running job finished; the queued one and the blocked one did not.
        let stats = pool.stats();
        assert_eq!(stats.completed_jobs, 1);
        assert_eq!(stats.dropped_jobs, 2);
        assert_eq!(stats.pending_jobs, 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_wait_jobs_async() {
        let pool = WorkerPool::<()>::new(2, 4).unwrap();
        pool.start(CancellationToken::never());
        let runs = Arc::new(AtomicUsize::new(0));
        for _ in 0..4 {
            let runs = Arc::clone(&runs);
            pool.add_job(new_job::<(), _, _>(
                move || {
                    thread::sleep(Duration::from_millis(10));
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                |_| {},
            ));
        }
        pool.wait_jobs_async().await;
        assert_eq!(runs.load(Ordering::SeqCst), 4);
        pool.stop();
    }
}
