//! Tests for cancellation and shutdown signals

use std::thread;
use std::time::Duration;

use bounded_worker_pool::{CancellationToken, WorkerPool};

#[test]
fn test_cancel_is_idempotent() {
    let token = CancellationToken::default();
    token.cancel();
    token.cancel();
    assert!(token.is_cancelled());
    token.wait();
}

#[test]
fn test_clones_share_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    let waiter = thread::spawn(move || clone.wait_timeout(Duration::from_secs(5)));
    thread::sleep(Duration::from_millis(10));
    token.cancel();
    assert!(waiter.join().unwrap());
}

#[test]
fn test_done_fires_on_stop() {
    let pool = WorkerPool::<()>::new(1, 1).expect("Failed to create pool");
    let done = pool.done();
    assert!(!done.is_done());
    pool.stop();
    assert!(done.is_done());
    assert!(done.wait_timeout(Duration::from_millis(1)));
    // Second stop is a no-op.
    pool.stop();
    assert!(pool.is_stopped());
}
