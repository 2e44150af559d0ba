//! Shared setup for commands that talk to remote services.
//!
//! [`CliRunner`] loads the configuration file, installs logging, builds the
//! Tokio runtime and wires Ctrl+C to a cancellation token.

use std::future::Future;

use songcapture::app::{AppConfig, SongCaptureApp};
use songcapture::config::{config_file_path, ConfigFile};
use songcapture::logging::{init_logging, LoggingConfig, LoggingGuard};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;

pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    shutdown: CancellationToken,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Prepares the environment; `verbose` forces debug logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let mut logging = LoggingConfig::from(&config.logging);
        if verbose {
            logging = logging.with_level("debug");
        }
        let guard = init_logging(&logging)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("songcapture")
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        let shutdown = CancellationToken::new();
        let handler_token = shutdown.clone();
        ctrlc::set_handler(move || {
            eprintln!();
            eprintln!("Received interrupt, stopping...");
            handler_token.cancel();
        })
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

        Ok(Self {
            config,
            runtime,
            shutdown,
            _logging: guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Fires when the user presses Ctrl+C.
    pub fn shutdown(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            config = %config_file_path().display(),
            "SongCapture CLI starting"
        );
    }

    /// Starts the application inside the runtime.
    pub fn create_app(&self, config: AppConfig) -> Result<SongCaptureApp, CliError> {
        let _enter = self.runtime.enter();
        Ok(SongCaptureApp::start(config)?)
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
