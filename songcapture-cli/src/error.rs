//! CLI error type.

use std::fmt;

use songcapture::app::AppError;
use songcapture::config::ConfigFileError;
use songcapture::logging::LoggingError;
use songcapture::repository::RepositoryError;

/// Errors reported to the user before exiting with a failure status.
#[derive(Debug)]
pub enum CliError {
    /// Invalid configuration or arguments.
    Config(String),

    /// Reading or writing the configuration file failed.
    ConfigFile(ConfigFileError),

    /// Logging could not be set up.
    Logging(LoggingError),

    /// The application failed to start.
    App(AppError),

    /// A playlist page could not be loaded.
    Repository(RepositoryError),

    /// Some artwork locators could not be resolved.
    Artwork { failed: usize, total: usize },

    /// The async runtime failed.
    Runtime(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Repository(e) => write!(f, "Failed to load playlists: {}", e),
            CliError::Artwork { failed, total } => {
                write!(f, "{} of {} artwork locators failed to resolve", failed, total)
            }
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Repository(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<RepositoryError> for CliError {
    fn from(e: RepositoryError) -> Self {
        CliError::Repository(e)
    }
}
