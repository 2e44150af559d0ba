//! Application error types.

use std::fmt;

use crate::config::ConfigFileError;
use crate::provider::ProviderError;
use crate::repository::RepositoryError;

/// Errors that can occur while starting the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to build the HTTP client.
    HttpClient(ProviderError),

    /// Failed to load the configuration file.
    ConfigFile(ConfigFileError),

    /// Configuration error.
    Config(String),

    /// No providers were configured.
    NoProviders,

    /// A repository call failed.
    Repository(RepositoryError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::HttpClient(e) => {
                write!(f, "Failed to create HTTP client: {}", e)
            }
            AppError::ConfigFile(e) => {
                write!(f, "Failed to load configuration: {}", e)
            }
            AppError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            AppError::NoProviders => {
                write!(f, "No playlist providers configured")
            }
            AppError::Repository(e) => {
                write!(f, "Repository error: {}", e)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::HttpClient(e) => Some(e),
            AppError::ConfigFile(e) => Some(e),
            AppError::Config(_) => None,
            AppError::NoProviders => None,
            AppError::Repository(e) => Some(e),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::HttpClient(e)
    }
}

impl From<ConfigFileError> for AppError {
    fn from(e: ConfigFileError) -> Self {
        AppError::ConfigFile(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}
