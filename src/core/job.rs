//! Job abstraction executed by the worker pool.
//!
//! A job is behaviour plus one flag: an execute step, an error handler, and
//! whether a [`JobResult`] should be emitted once the job has run. The pool
//! depends only on the [`Job`] trait; [`ClosureJob`] covers the common case
//! of wiring two closures together.
//!
//! The execute step reports a [`JobOutcome`]: an optional value and an
//! optional error, which may both be set when a job fails part way.
//!
//! # Example
//!
//! ```
//! use bounded_worker_pool::core::{new_job, new_job_with_result, Job};
//!
//! let fire_and_forget = new_job::<String, _, _>(|| Ok(()), |err| eprintln!("{err}"));
//! assert!(!fire_and_forget.should_return_result());
//!
//! let fetch = new_job_with_result(|| Ok("200 OK".to_string()), |err| eprintln!("{err}"));
//! assert!(fetch.should_return_result());
//! assert_eq!(fetch.execute().into_result().unwrap(), Some("200 OK".to_string()));
//! ```

use std::fmt;
use std::sync::Arc;

use super::error::{AppResult, JobError};

/// A unit of work the pool can run.
///
/// Implementations must be shareable across threads: the same job may be
/// submitted several times and picked up by different workers.
pub trait Job<T>: Send + Sync {
    /// Run the job.
    ///
    /// An error in the outcome is handed to [`Job::on_error`]. When a result
    /// is wanted, value and error are both carried into the [`JobResult`].
    fn execute(&self) -> JobOutcome<T>;

    /// Called on the worker thread when [`Job::execute`] failed, before any
    /// result is emitted.
    fn on_error(&self, err: &JobError);

    /// Whether the pool should publish a [`JobResult`] for this job.
    fn should_return_result(&self) -> bool;
}

impl<T> fmt::Debug for dyn Job<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("should_return_result", &self.should_return_result())
            .finish()
    }
}

/// Value and error produced by one execution of a job.
#[derive(Debug)]
pub struct JobOutcome<T> {
    value: Option<T>,
    error: Option<JobError>,
}

impl<T> JobOutcome<T> {
    /// Outcome with an arbitrary combination of value and error.
    pub const fn new(value: Option<T>, error: Option<JobError>) -> Self {
        Self { value, error }
    }

    /// Success with nothing to report.
    pub const fn empty() -> Self {
        Self::new(None, None)
    }

    /// Success with a value.
    pub const fn with_value(value: T) -> Self {
        Self::new(Some(value), None)
    }

    /// Failure without a value.
    pub const fn failed(error: JobError) -> Self {
        Self::new(None, Some(error))
    }

    /// Failure that still produced a value.
    pub const fn partial(value: T, error: JobError) -> Self {
        Self::new(Some(value), Some(error))
    }

    /// Value produced, if any.
    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Error raised, if any.
    pub const fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    /// `true` when no error was raised.
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a plain `Result`. A value reported alongside an error
    /// is discarded.
    ///
    /// # Errors
    ///
    /// Returns the outcome's error, if any.
    pub fn into_result(self) -> AppResult<Option<T>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }

    /// Split into value and error.
    pub fn into_parts(self) -> (Option<T>, Option<JobError>) {
        (self.value, self.error)
    }
}

impl<T> From<AppResult<Option<T>>> for JobOutcome<T> {
    fn from(result: AppResult<Option<T>>) -> Self {
        match result {
            Ok(value) => Self::new(value, None),
            Err(err) => Self::failed(err),
        }
    }
}

type ExecuteFn<T> = Box<dyn Fn() -> JobOutcome<T> + Send + Sync>;
type ErrorHandler = Box<dyn Fn(&JobError) + Send + Sync>;

/// Job built from an execute closure and an error handler.
pub struct ClosureJob<T> {
    execute: ExecuteFn<T>,
    on_error: ErrorHandler,
    returns_result: bool,
}

impl<T: 'static> ClosureJob<T> {
    /// Create a job that never produces a [`JobResult`].
    pub fn new<F, H>(execute: F, on_error: H) -> Self
    where
        F: Fn() -> AppResult<()> + Send + Sync + 'static,
        H: Fn(&JobError) + Send + Sync + 'static,
    {
        Self {
            execute: Box::new(move || JobOutcome::<T>::from(execute().map(|()| None))),
            on_error: Box::new(on_error),
            returns_result: false,
        }
    }

    /// Create a job whose value (or error) is published on the result queue.
    pub fn with_result<F, H>(execute: F, on_error: H) -> Self
    where
        F: Fn() -> AppResult<T> + Send + Sync + 'static,
        H: Fn(&JobError) + Send + Sync + 'static,
    {
        Self {
            execute: Box::new(move || JobOutcome::<T>::from(execute().map(Some))),
            on_error: Box::new(on_error),
            returns_result: true,
        }
    }

    /// Create a result-wanting job whose execute step reports value and
    /// error independently, e.g. a response body read before a failure.
    pub fn with_outcome<F, H>(execute: F, on_error: H) -> Self
    where
        F: Fn() -> JobOutcome<T> + Send + Sync + 'static,
        H: Fn(&JobError) + Send + Sync + 'static,
    {
        Self {
            execute: Box::new(execute),
            on_error: Box::new(on_error),
            returns_result: true,
        }
    }
}

impl<T> Job<T> for ClosureJob<T> {
    fn execute(&self) -> JobOutcome<T> {
        (self.execute)()
    }

    fn on_error(&self, err: &JobError) {
        (self.on_error)(err);
    }

    fn should_return_result(&self) -> bool {
        self.returns_result
    }
}

impl<T> fmt::Debug for ClosureJob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureJob")
            .field("returns_result", &self.returns_result)
            .finish_non_exhaustive()
    }
}

/// Shorthand for [`ClosureJob::new`], shared so it can be submitted repeatedly.
pub fn new_job<T, F, H>(execute: F, on_error: H) -> Arc<ClosureJob<T>>
where
    T: 'static,
    F: Fn() -> AppResult<()> + Send + Sync + 'static,
    H: Fn(&JobError) + Send + Sync + 'static,
{
    Arc::new(ClosureJob::new(execute, on_error))
}

/// Shorthand for [`ClosureJob::with_result`].
pub fn new_job_with_result<T, F, H>(execute: F, on_error: H) -> Arc<ClosureJob<T>>
where
    T: 'static,
    F: Fn() -> AppResult<T> + Send + Sync + 'static,
    H: Fn(&JobError) + Send + Sync + 'static,
{
    Arc::new(ClosureJob::with_result(execute, on_error))
}

/// Shorthand for [`ClosureJob::with_outcome`].
pub fn new_job_with_outcome<T, F, H>(execute: F, on_error: H) -> Arc<ClosureJob<T>>
where
    T: 'static,
    F: Fn() -> JobOutcome<T> + Send + Sync + 'static,
    H: Fn(&JobError) + Send + Sync + 'static,
{
    Arc::new(ClosureJob::with_outcome(execute, on_error))
}

/// Outcome of one result-wanting job.
///
/// Holds whatever the execute step produced together with the job that
/// produced it. Immutable once created; consumers take ownership by reading
/// it off [`WorkerPool::results`](crate::core::WorkerPool::results).
pub struct JobResult<T> {
    value: Option<T>,
    error: Option<JobError>,
    job: Arc<dyn Job<T>>,
}

impl<T> JobResult<T> {
    pub(crate) fn new(value: Option<T>, error: Option<JobError>, job: Arc<dyn Job<T>>) -> Self {
        Self { value, error, job }
    }

    /// Value returned by the job, if any.
    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Error returned by the job, if any.
    pub const fn error(&self) -> Option<&JobError> {
        self.error.as_ref()
    }

    /// The job that produced this result.
    pub fn job(&self) -> &Arc<dyn Job<T>> {
        &self.job
    }

    /// `true` when the job finished without an error.
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a plain `Result`, dropping the job reference. A value
    /// reported alongside an error is discarded; use
    /// [`JobResult::into_parts`] to keep both.
    ///
    /// # Errors
    ///
    /// Returns the job's error when it failed.
    pub fn into_result(self) -> AppResult<Option<T>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }

    /// Split into value, error and producing job.
    pub fn into_parts(self) -> (Option<T>, Option<JobError>, Arc<dyn Job<T>>) {
        (self.value, self.error, self.job)
    }
}

impl<T: fmt::Debug> fmt::Debug for JobResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobResult")
            .field("value", &self.value)
            .field("error", &self.error)
            .field("job", &self.job)
            .finish()
    }
}
