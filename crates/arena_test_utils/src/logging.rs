//! Log capture for tests.
//!
//! The simulation only emits `tracing` events. Tests that want to see
//! them call [`init_test_logging`] once; output goes through the test
//! writer so it is captured per test and shown on failure.

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static INIT: Once = Once::new();

/// Install a fmt subscriber filtered by `RUST_LOG`. Safe to call from
/// every test; only the first call installs anything.
pub fn init_test_logging() {
    INIT.call_once(|| {
        // Another harness may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("logging initialised twice without panicking");
    }
}
