//! Tracing setup for the CLI and the server.
//!
//! Operational events (provider fallbacks, repository mutations) go to stderr
//! so stdout stays reserved for JSON responses.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`; falls back to `default_directive` if unset or invalid.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=copilot=debug copilot chat "how do I cache pip in CI?"
/// ```
pub fn init(default_directive: &str) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(env_filter(rust_log.as_deref(), default_directive))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

/// Build the filter: `rust_log` wins when it parses, else `default_directive`.
pub fn env_filter(rust_log: Option<&str>, default_directive: &str) -> EnvFilter {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive))
}
