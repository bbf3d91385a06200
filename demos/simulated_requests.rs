//! Drives a worker pool with simulated outbound requests and logs outcomes.
//!
//! ```text
//! RUST_LOG=info cargo run --example simulated_requests
//! WORKER_POOL_WORKER_COUNT=8 cargo run --example simulated_requests
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bounded_worker_pool::config::{ENV_QUEUE_CAPACITY, ENV_WORKER_COUNT};
use bounded_worker_pool::util::init_tracing;
use bounded_worker_pool::{
    new_job_with_result, AppResult, CancellationToken, JobError, PoolConfig, WorkerPool,
};
use crossbeam_channel::select;
use rand::Rng;
use tracing::{error, info, warn};

const TOTAL_REQUESTS: usize = 500;
const URL: &str = "https://example.com/";

fn send_request() -> AppResult<String> {
    let mut rng = rand::rng();
    // Simulate network latency.
    thread::sleep(Duration::from_millis(rng.random_range(50..150)));

    if rng.random_bool(0.1) {
        anyhow::bail!("{URL} timed out");
    }
    let status = if rng.random_bool(0.95) { 200 } else { 503 };
    Ok(format!("{URL} returned status code {status}"))
}

fn handle_request_error(err: &JobError) {
    warn!(error = %err, "request error");
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let start = Instant::now();

    let config = PoolConfig::from_lookup(|key| {
        std::env::var(key).ok().or_else(|| match key {
            ENV_WORKER_COUNT => Some("50".into()),
            ENV_QUEUE_CAPACITY => Some("200".into()),
            _ => None,
        })
    })?;
    let pool = Arc::new(WorkerPool::<String>::with_config(config)?);
    let cancel = CancellationToken::new();

    let producer = {
        let pool = Arc::clone(&pool);
        let cancel = cancel.clone();
        thread::spawn(move || {
            let job = new_job_with_result(send_request, handle_request_error);
            pool.start(cancel);
            for _ in 0..TOTAL_REQUESTS {
                pool.add_job(job.clone());
            }
            pool.wait_jobs();
            info!("stopping pool after results");
            pool.stop();
        })
    };

    let results = pool.results();
    let done = pool.done();
    let (mut processed, mut with_error) = (0_usize, 0_usize);

    loop {
        select! {
            recv(results) -> msg => {
                let Ok(result) = msg else { break };
                processed += 1;
                match result.error() {
                    Some(err) => {
                        with_error += 1;
                        info!(result = %format!("[ERROR] {err}"), "result");
                    }
                    None => {
                        let value = result.value().map_or("", String::as_str);
                        info!(result = %format!("[SUCCESS] {value}"), "result");
                    }
                }
            },
            recv(done.receiver()) -> _ => {
                // Buffered results can still be read after the queue closes.
                for result in results.try_iter() {
                    processed += 1;
                    with_error += usize::from(!result.is_ok());
                }
                break;
            },
        }
    }

    if producer.join().is_err() {
        error!("producer thread panicked");
        cancel.cancel();
    }

    info!(total = processed, "total jobs processed");
    info!(succeeded = processed - with_error, "jobs processed successfully");
    info!(failed = with_error, "jobs processed with error");
    info!(seconds = start.elapsed().as_secs_f64(), "execution time");
    Ok(())
}
