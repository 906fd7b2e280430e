//! Structured, leveled, daily-rotating logs, grounded on `LoggerManager`'s
//! `TimedRotatingFileHandler` setup. `tracing`'s per-module targets take the
//! place of the original's separate access/error/ads/trends loggers — the
//! `kwmetrics_ads`/`kwmetrics_trends`/etc. crates already tag their events
//! by module path.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global subscriber. The returned guard must be held for
/// the lifetime of the process — dropping it stops the background flush
/// thread and log lines are lost.
pub fn init(log_dir: &std::path::Path, level: &str) -> WorkerGuard {
    std::fs::create_dir_all(log_dir).expect("failed to create log directory");

    let file_appender = tracing_appender::rolling::daily(log_dir, "kwmetrics.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    guard
}
