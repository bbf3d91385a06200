//! Tests for configuration validation

use bounded_worker_pool::config::{PoolConfig, ENV_QUEUE_CAPACITY, ENV_WORKER_COUNT};
use bounded_worker_pool::ConfigError;

fn config(worker_count: usize, queue_capacity: usize) -> PoolConfig {
    PoolConfig::new()
        .with_worker_count(worker_count)
        .with_queue_capacity(queue_capacity)
}

#[test]
fn test_pool_config_validation() {
    assert!(config(10, 20).validate().is_ok());
}

#[test]
fn test_pool_config_zero_capacity_is_valid() {
    assert!(config(2, 0).validate().is_ok());
}

#[test]
fn test_pool_config_invalid_worker_count() {
    assert_eq!(config(0, 20).validate(), Err(ConfigError::ZeroWorkers));
}

#[test]
fn test_pool_config_invalid_thread_prefix() {
    let invalid = config(1, 1).with_thread_name_prefix("  ");
    assert!(matches!(
        invalid.validate(),
        Err(ConfigError::InvalidValue { ref key, .. }) if key == "thread_name_prefix"
    ));
}

#[test]
fn test_pool_config_from_json() {
    let json = r#"{
        "worker_count": 50,
        "queue_capacity": 200,
        "thread_name_prefix": "http",
        "thread_stack_size": 1048576
    }"#;

    let cfg = PoolConfig::from_json_str(json).expect("valid config");
    assert_eq!(cfg.worker_count, 50);
    assert_eq!(cfg.queue_capacity, 200);
    assert_eq!(cfg.thread_name_prefix, "http");
    assert_eq!(cfg.thread_stack_size, Some(1_048_576));
}

#[test]
fn test_pool_config_from_json_defaults_missing_fields() {
    let cfg = PoolConfig::from_json_str(r#"{"worker_count": 3}"#).expect("valid config");
    let defaults = PoolConfig::default();
    assert_eq!(cfg.worker_count, 3);
    // Capacity defaults to twice the configured worker count.
    assert_eq!(cfg.queue_capacity, 6);
    assert_eq!(cfg.thread_name_prefix, defaults.thread_name_prefix);
}

#[test]
fn test_pool_config_from_json_rejects_bad_input() {
    assert!(matches!(
        PoolConfig::from_json_str("not json"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        PoolConfig::from_json_str(r#"{"workers": 4}"#),
        Err(ConfigError::Parse(_))
    ));
    assert_eq!(
        PoolConfig::from_json_str(r#"{"worker_count": 0}"#),
        Err(ConfigError::ZeroWorkers)
    );
    assert_eq!(
        PoolConfig::from_json_str(r#"{"worker_count": -3}"#),
        Err(ConfigError::NegativeWorkers(-3))
    );
    assert_eq!(
        PoolConfig::from_json_str(r#"{"queue_capacity": -1}"#),
        Err(ConfigError::NegativeQueueCapacity(-1))
    );
}

#[test]
fn test_pool_config_serde_roundtrip_shape() {
    let cfg = config(4, 8);
    let value = serde_json::to_value(&cfg).expect("serializable");
    assert_eq!(value["worker_count"], 4);
    assert_eq!(value["queue_capacity"], 8);
    assert!(value["thread_stack_size"].is_null());
}

#[test]
fn test_pool_config_from_lookup_zero_workers() {
    let result = PoolConfig::from_lookup(|key| match key {
        k if k == ENV_WORKER_COUNT => Some("0".into()),
        k if k == ENV_QUEUE_CAPACITY => Some("20".into()),
        _ => None,
    });
    assert_eq!(result, Err(ConfigError::ZeroWorkers));
}
