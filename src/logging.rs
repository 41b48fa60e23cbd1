//! Tracing setup for the service binary and tests.
//!
//! The prediction core never logs; only the HTTP layer and the chat client
//! emit events.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `default_level` applies when `RUST_LOG` is unset or unparsable, e.g.
/// `"info"` or `"hayya=debug,tower_http=info"`.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .init();
}

/// Send events to the test harness's captured output. Repeat calls are no-ops.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("hayya=debug"))
        .try_init();
}
