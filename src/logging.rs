//! Logging - tracing subscriber setup
//!
//! stderr always; a daily-rolling file as well when `log.directory` is set.
//! `RUST_LOG` overrides the configured level.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::constants::LOG_FILE_PREFIX;
use crate::domain::config::LogConfig;

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the life of the process.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let result = tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_timer(fmt::time::LocalTime::rfc_3339())
                        .with_writer(writer),
                )
                .try_init();
            if result.is_err() {
                return None;
            }
            tracing::debug!("Writing logs to {}", directory);
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .try_init();
            None
        }
    }
}
