//! Logging setup for the driver.
//!
//! Everything goes to stderr so token dumps on stdout stay machine-readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "MONTY_LOG";

/// Install the global subscriber at `level` (e.g. `warn`, `debug`).
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let layer = fmt::layer()
        .compact()
        .with_target(true)
        .without_time()
        .with_writer(std::io::stderr);

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
