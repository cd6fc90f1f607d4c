//! Structured logging setup (§10 "Logging").

/// Initialize the global `tracing` subscriber. `RUST_LOG` overrides `level`
/// when set, matching the convention every service in this stack follows.
pub fn init_logger(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
