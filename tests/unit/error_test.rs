//! Tests for error types

use bounded_worker_pool::{ConfigError, PoolError};

#[test]
fn test_zero_workers_error() {
    let err = ConfigError::ZeroWorkers;
    assert_eq!(format!("{}", err), "worker_count must be greater than zero");
}

#[test]
fn test_negative_workers_error() {
    let err = ConfigError::NegativeWorkers(-1);
    assert_eq!(format!("{}", err), "worker_count must be greater than zero (got -1)");
}

#[test]
fn test_negative_capacity_error() {
    let err = ConfigError::NegativeQueueCapacity(-5);
    assert_eq!(format!("{}", err), "queue_capacity cannot be negative (got -5)");
}

#[test]
fn test_parse_error() {
    let err = ConfigError::Parse("expected value".to_string());
    assert_eq!(format!("{}", err), "parse error: expected value");
}

#[test]
fn test_pool_error_from_config_error() {
    let err = PoolError::from(ConfigError::ZeroWorkers);
    assert_eq!(
        format!("{}", err),
        "invalid configuration: worker_count must be greater than zero"
    );
    let source = std::error::Error::source(&err).expect("config error is the source");
    assert_eq!(source.to_string(), "worker_count must be greater than zero");
}
