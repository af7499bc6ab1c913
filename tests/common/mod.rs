#![allow(dead_code)]

pub use procctl_test_utils::init_tracing;

pub type TestResult = anyhow::Result<()>;
