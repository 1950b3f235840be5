//! Logging setup for hosts embedding the synchronizer
//!
//! The library itself only emits `tracing` events; this module installs a
//! subscriber for binaries and examples that want to see them.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber installed
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode
///
/// # Environment Variables
///
/// - `RAKO_LOG_LEVEL`: Override the filter (e.g. `rako_state=debug`)
/// - `RUST_LOG`: Used when `RAKO_LOG_LEVEL` is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .compact(),
                )
                .with(create_env_filter("info"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(create_env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initialize logging from `RAKO_LOG_MODE` ("development", "debug")
///
/// Anything else, including an unset variable, is silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    init_logging(mode_from_str(std::env::var("RAKO_LOG_MODE").ok().as_deref()))
}

fn mode_from_str(mode: Option<&str>) -> LoggingMode {
    match mode {
        Some("development") => LoggingMode::Development,
        Some("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    }
}

/// Filter from `RAKO_LOG_LEVEL`, then `RUST_LOG`, then `default_level`
fn create_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var("RAKO_LOG_LEVEL") {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}
