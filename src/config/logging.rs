use std::env;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize structured logging for the routing engine. Honors RUST_LOG;
/// defaults to info. Safe to call more than once (later calls are no-ops).
pub fn init_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true));

    if let Err(e) = subscriber.try_init() {
        eprintln!("Failed to initialize tracing subscriber: {e}");
    }
}
