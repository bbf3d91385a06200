//! Tests for the job abstraction

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bounded_worker_pool::{
    new_job, new_job_with_outcome, new_job_with_result, ClosureJob, Job, JobError, JobOutcome,
};

#[test]
fn test_closure_job_without_result() {
    let job: ClosureJob<String> = ClosureJob::new(|| Ok(()), |_| {});
    assert!(!job.should_return_result());
    let outcome = job.execute();
    assert!(outcome.is_ok());
    assert!(outcome.value().is_none());
}

#[test]
fn test_closure_job_with_result() {
    let job = ClosureJob::with_result(|| Ok(String::from("200 OK")), |_| {});
    assert!(job.should_return_result());
    assert_eq!(job.execute().into_result().unwrap().as_deref(), Some("200 OK"));
}

#[test]
fn test_error_passes_through_execute() {
    let job = new_job_with_result::<u8, _, _>(|| Err(anyhow::anyhow!("timeout")), |_| {});
    let err = job.execute().into_result().unwrap_err();
    assert_eq!(err.to_string(), "timeout");
}

#[test]
fn test_outcome_job_reports_value_and_error() {
    let job = new_job_with_outcome(
        || JobOutcome::partial(3_u32, anyhow::anyhow!("2 of 5 shards failed")),
        |_| {},
    );
    assert!(job.should_return_result());

    let (value, error) = job.execute().into_parts();
    assert_eq!(value, Some(3));
    assert_eq!(error.unwrap().to_string(), "2 of 5 shards failed");
}

#[test]
fn test_job_is_reusable() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let job = new_job::<(), _, _>(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        |_| {},
    );

    for _ in 0..3 {
        assert!(job.execute().is_ok());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_custom_job_implementation() {
    struct Ping;

    impl Job<&'static str> for Ping {
        fn execute(&self) -> JobOutcome<&'static str> {
            JobOutcome::with_value("pong")
        }

        fn on_error(&self, _err: &JobError) {}

        fn should_return_result(&self) -> bool {
            true
        }
    }

    let job: Arc<dyn Job<&'static str>> = Arc::new(Ping);
    assert_eq!(job.execute().value(), Some(&"pong"));
    assert_eq!(format!("{job:?}"), "Job { should_return_result: true }");
}
