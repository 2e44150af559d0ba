//! Logging setup.
//!
//! Installs a global `tracing` subscriber with:
//!
//! - an `EnvFilter` built from the configured level (`RUST_LOG` wins)
//! - a human-readable layer on stderr
//! - optionally, a daily-rolling file layer written off-thread
//!
//! Keep the returned [`LoggingGuard`] alive for the life of the program;
//! dropping it flushes buffered file output.

use std::path::PathBuf;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LoggingSettings, DEFAULT_LOG_LEVEL};

/// Prefix of daily log file names.
pub const DEFAULT_LOG_FILE_PREFIX: &str = "songcapture.log";

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory for log files; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    /// `EnvFilter` directive such as `info` or `songcapture=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.directory = directory;
        self
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            directory: settings.directory.clone(),
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            level: settings.level.clone(),
        }
    }
}

/// Flushes the file writer when dropped.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Builds the filter, preferring `RUST_LOG` over the configured level.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|_| LoggingError::InvalidFilter(level.to_string())),
    }
}

/// Installs the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&config.level)?;

    // Local offset lookup can fail in multi-threaded processes; fall back to UTC.
    let timer = OffsetTime::local_rfc_3339().unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let (file_layer, file_guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            directory: Some(PathBuf::from("/tmp/logs")),
            level: "debug".to_string(),
        };
        let config = LoggingConfig::from(&settings);
        assert_eq!(config.directory, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.level, "debug");
        assert_eq!(config.file_prefix, DEFAULT_LOG_FILE_PREFIX);
    }

    #[test]
    fn test_builders() {
        let config = LoggingConfig::default()
            .with_level("warn")
            .with_directory(Some(PathBuf::from("logs")));
        assert_eq!(config.level, "warn");
        assert_eq!(config.directory, Some(PathBuf::from("logs")));
    }

    #[test]
    fn test_filter_accepts_directives() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(build_filter("songcapture=debug,info").is_ok());
        }
    }
}
