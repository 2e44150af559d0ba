//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use songcapture::app::AppConfig;
use songcapture::config::ConfigFile;
use songcapture::playlist::Service;

use crate::error::CliError;

/// Music service selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ServiceArg {
    /// Apple Music library playlists (requires developer and user tokens)
    AppleMusic,
    /// Spotify playlists (not yet paginated; always empty)
    Spotify,
}

impl From<ServiceArg> for Service {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::AppleMusic => Service::AppleMusic,
            ServiceArg::Spotify => Service::Spotify,
        }
    }
}

/// Resolve application settings from CLI args and config.
///
/// CLI values take precedence over the configuration file.
pub fn resolve_app_config(
    config: &ConfigFile,
    page_size: Option<usize>,
    threshold: Option<usize>,
) -> Result<AppConfig, CliError> {
    let mut app_config = AppConfig::from_config_file(config);

    if let Some(page_size) = page_size {
        if page_size == 0 {
            return Err(CliError::Config("--page-size must be at least 1".to_string()));
        }
        app_config = app_config.with_page_size(page_size);
    }
    if let Some(threshold) = threshold {
        app_config = app_config.with_prefetch_threshold(threshold);
    }

    Ok(app_config)
}

/// A spinner drawn on stderr.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(msg.to_string());
    pb
}
