//! Shared test support.

use tracing_subscriber::{fmt, EnvFilter};

/// Install a fmt subscriber for the test binary. Honors `RUST_LOG`; safe to
/// call from every test (only the first call wins).
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
