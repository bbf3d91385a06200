//! Worker thread loop.
//!
//! Each worker blocks in a single `select!` on three sources: the external
//! cancellation token, the pool's shutdown signal and the job queue. No
//! polling; whichever fires first wins.

use std::any::Any;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::select;
use tracing::{debug, error};

use crate::config::PoolConfig;
use crate::core::error::JobError;
use crate::core::job::{Job, JobOutcome, JobResult};

use super::Shared;

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Cancelled,
    Shutdown,
    QueueClosed,
}

enum Event<T> {
    Job(Arc<dyn Job<T>>),
    Exit(Exit),
}

/// Spawn worker `worker_id` (1-based) on a named OS thread.
pub(super) fn spawn_worker<T>(
    worker_id: usize,
    shared: Arc<Shared<T>>,
    config: &PoolConfig,
) -> io::Result<JoinHandle<()>>
where
    T: Send + 'static,
{
    let mut builder =
        thread::Builder::new().name(format!("{}-{worker_id}", config.thread_name_prefix));
    if let Some(stack_size) = config.thread_stack_size {
        builder = builder.stack_size(stack_size);
    }
    builder.spawn(move || run(worker_id, &shared))
}

fn run<T>(worker_id: usize, shared: &Shared<T>) {
    debug!(worker_id = worker_id, pool_id = %shared.id, "Worker started");

    let cancel = shared.cancel_token();
    let shutdown = shared.shutdown.receiver();

    let exit = loop {
        // Cancellation wins over a ready job.
        if cancel.is_cancelled() {
            break Exit::Cancelled;
        }

        let event = select! {
            recv(cancel.receiver()) -> _ => Event::Exit(Exit::Cancelled),
            recv(shutdown) -> _ => Event::Exit(Exit::Shutdown),
            recv(shared.job_rx) -> msg => match msg {
                Ok(job) => Event::Job(job),
                Err(_) => Event::Exit(Exit::QueueClosed),
            },
        };

        match event {
            Event::Job(job) => execute(worker_id, shared, job),
            Event::Exit(exit) => break exit,
        }
    };

    if exit == Exit::Cancelled {
        let discarded = shared.discard_queued();
        if discarded > 0 {
            debug!(worker_id = worker_id, discarded = discarded, "Queue drained after cancellation");
        }
    }

    debug!(worker_id = worker_id, reason = ?exit, "Worker exiting");
}

/// Run one job: execute, route any error to its handler, publish the result
/// if wanted, then release its pending slot.
fn execute<T>(worker_id: usize, shared: &Shared<T>, job: Arc<dyn Job<T>>) {
    let counters = &shared.counters;
    counters.active_jobs.fetch_add(1, Ordering::Relaxed);

    let (value, error) = catch_unwind(AssertUnwindSafe(|| job.execute()))
        .unwrap_or_else(|payload| JobOutcome::failed(panic_error(payload.as_ref())))
        .into_parts();

    if let Some(err) = &error {
        counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
        debug!(worker_id = worker_id, error = %err, "Job failed");
        if catch_unwind(AssertUnwindSafe(|| job.on_error(err))).is_err() {
            error!(worker_id = worker_id, "Job error handler panicked");
        }
    }

    if job.should_return_result() {
        shared.publish(JobResult::new(value, error, job));
    }

    counters.active_jobs.fetch_sub(1, Ordering::Relaxed);
    counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
    shared.pending.done();
}

fn panic_error(payload: &(dyn Any + Send)) -> JobError {
    let message = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    anyhow::anyhow!("job panicked: {message}")
}
