//! Shared helpers for the procctl integration tests: spec/config builders and
//! a ready-made in-memory OS ([`fixtures::MockWorld`]).

pub mod builders;
pub mod fixtures;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING: Once = Once::new();

/// Install a test-friendly subscriber once per test binary.
///
/// Output goes through the test writer, so it only shows up for failing tests
/// or with `--nocapture`. `RUST_LOG` picks the filter (default `warn`, which
/// keeps the resolver's warnings visible).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}
