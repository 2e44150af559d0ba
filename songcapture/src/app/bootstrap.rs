//! Application bootstrap implementation.
//!
//! This module contains `SongCaptureApp`, which wires configuration into a
//! running set of services in dependency order.

use std::sync::Arc;

use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::artwork::ArtworkLoader;
use crate::library::{LibraryStore, SelectionStore};
use crate::playlist::Service;
use crate::prefetch::PrefetchTrigger;
use crate::provider::{AsyncReqwestClient, ProviderFactory};
use crate::repository::RemotePlaylistRepository;

/// SongCapture application services.
///
/// Services are created in this order:
/// 1. One shared HTTP client
/// 2. Providers for every configured service
/// 3. The playlist repository over those providers
/// 4. The artwork loader on the same HTTP client
/// 5. Session-local library and selection stores
///
/// # Example
///
/// ```ignore
/// use songcapture::app::{AppConfig, SongCaptureApp};
///
/// let app = SongCaptureApp::start(AppConfig::default())?;
/// app.repository().load_more(Service::AppleMusic).await?;
/// ```
pub struct SongCaptureApp {
    config: AppConfig,
    repository: Arc<RemotePlaylistRepository>,
    artwork: ArtworkLoader,
    library: Arc<LibraryStore>,
    selection: Arc<SelectionStore>,
}

impl SongCaptureApp {
    /// Start the application with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable or the HTTP client
    /// cannot be built.
    pub fn start(config: AppConfig) -> Result<Self, AppError> {
        if config.providers.is_empty() {
            return Err(AppError::NoProviders);
        }
        if config.repository.page_size == 0 {
            return Err(AppError::Config("page size must be positive".to_string()));
        }

        let http_client = AsyncReqwestClient::with_timeout(config.http_timeout_secs)?;

        let factory = ProviderFactory::new(http_client.clone());
        let providers = factory.create_all(&config.providers);
        let repository = Arc::new(RemotePlaylistRepository::new(providers, config.repository));

        let artwork = ArtworkLoader::with_http_client(http_client, &config.artwork);

        info!(
            services = ?repository.services(),
            page_size = config.repository.page_size,
            prefetch_threshold = config.prefetch.threshold,
            artwork_memory = config.artwork.memory_size,
            "SongCapture started"
        );

        Ok(Self {
            config,
            repository,
            artwork,
            library: Arc::new(LibraryStore::new()),
            selection: Arc::new(SelectionStore::new()),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<RemotePlaylistRepository> {
        &self.repository
    }

    pub fn artwork(&self) -> &ArtworkLoader {
        &self.artwork
    }

    pub fn library(&self) -> &Arc<LibraryStore> {
        &self.library
    }

    pub fn selection(&self) -> &Arc<SelectionStore> {
        &self.selection
    }

    /// Services with a registered provider.
    pub fn services(&self) -> Vec<Service> {
        self.repository.services()
    }

    /// A prefetch trigger for one service's list view.
    pub fn prefetch_trigger(&self, service: Service) -> PrefetchTrigger {
        PrefetchTrigger::new(Arc::clone(&self.repository), service, self.config.prefetch)
    }

    /// Saves the currently selected rows of `service` into the library.
    pub fn save_selection(&self, service: Service) -> Result<usize, AppError> {
        let snapshot = self.repository.current_snapshot(service)?;
        Ok(self
            .library
            .save_selected(&self.selection.selected(), &snapshot))
    }
}
