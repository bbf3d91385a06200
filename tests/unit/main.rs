//! Unit tests for individual components

mod config_test;
mod error_test;
mod job_test;
mod signal_test;
mod util_test;
