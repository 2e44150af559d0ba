//! Per-service pagination orchestration.
//!
//! [`RemotePlaylistRepository`] owns one provider and one
//! [`RemotePlaylistCache`] per service. It turns "show me more" into at most
//! one provider fetch at a time per service, merges the result, and
//! publishes the new snapshot to subscribers.
//!
//! Services are fully independent: a slow or failing Apple Music fetch never
//! blocks a Spotify load.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::cache::{FetchMode, LoadAdmission, MergeOutcome, RemotePlaylistCache, SkipReason};
use crate::playlist::{PlaylistSnapshot, Service};
use crate::prefetch::should_load_more;
use crate::provider::{PlaylistProvider, ProviderError};

/// Default number of playlists requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Errors returned by the repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("No provider registered for {0}")]
    UnknownService(Service),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// What a call to [`RemotePlaylistRepository::load_more`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and merged.
    Loaded {
        new_items: usize,
        can_load_more: bool,
    },
    /// Nothing was fetched, or the fetched page was discarded.
    Skipped(SkipReason),
}

impl LoadOutcome {
    /// True if a page was merged.
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Repository tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Playlists requested per page.
    pub page_size: usize,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

struct ServiceEntry {
    provider: Arc<dyn PlaylistProvider>,
    cache: RemotePlaylistCache,
}

/// Paginated playlist access for every configured service.
pub struct RemotePlaylistRepository {
    entries: HashMap<Service, ServiceEntry>,
    config: RepositoryConfig,
}

impl RemotePlaylistRepository {
    /// Creates a repository over `providers`.
    ///
    /// If two providers report the same service, the later one wins.
    pub fn new(providers: Vec<Arc<dyn PlaylistProvider>>, config: RepositoryConfig) -> Self {
        let entries = providers
            .into_iter()
            .map(|provider| {
                let service = provider.service();
                let entry = ServiceEntry {
                    provider,
                    cache: RemotePlaylistCache::new(service),
                };
                (service, entry)
            })
            .collect();

        Self { entries, config }
    }

    /// Services with a registered provider, in declaration order.
    pub fn services(&self) -> Vec<Service> {
        Service::ALL
            .iter()
            .copied()
            .filter(|s| self.entries.contains_key(s))
            .collect()
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn entry(&self, service: Service) -> Result<&ServiceEntry, RepositoryError> {
        self.entries
            .get(&service)
            .ok_or(RepositoryError::UnknownService(service))
    }

    /// Discards everything cached for `service`.
    ///
    /// A load in flight at the time of the reset completes, but its page is
    /// dropped and its outcome is [`SkipReason::Superseded`].
    pub fn reset(&self, service: Service) -> Result<(), RepositoryError> {
        self.entry(service)?.cache.reset();
        Ok(())
    }

    /// Fetches and merges the next page for `service`.
    ///
    /// At most one fetch per service is in flight; concurrent callers get
    /// [`SkipReason::InFlight`] and observe the result through
    /// [`subscribe`](Self::subscribe). A provider failure leaves the cache
    /// as it was, so the same page is requested again on the next call.
    #[instrument(level = "debug", skip_all, fields(service = %service))]
    pub async fn load_more(&self, service: Service) -> Result<LoadOutcome, RepositoryError> {
        let entry = self.entry(service)?;

        let ticket = match entry.cache.try_begin_load() {
            LoadAdmission::Admitted(ticket) => ticket,
            LoadAdmission::Skipped(reason) => {
                debug!(?reason, "Load skipped");
                return Ok(LoadOutcome::Skipped(reason));
            }
        };

        let limit = self.config.page_size;
        let result = match ticket.mode() {
            FetchMode::FirstPage => entry.provider.fetch_first_page(limit).await,
            FetchMode::NextPage(token) => {
                entry.provider.fetch_next_page(limit, token.clone()).await
            }
        };

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, provider = entry.provider.name(), "Playlist page fetch failed");
                return Err(e.into());
            }
        };

        let outcome = match entry.cache.merge_ticket(&ticket, page) {
            MergeOutcome::Applied {
                new_items,
                can_load_more,
            } => LoadOutcome::Loaded {
                new_items,
                can_load_more,
            },
            MergeOutcome::Superseded => LoadOutcome::Skipped(SkipReason::Superseded),
        };
        Ok(outcome)
    }

    /// Current snapshot for `service`.
    pub fn current_snapshot(&self, service: Service) -> Result<PlaylistSnapshot, RepositoryError> {
        Ok(self.entry(service)?.cache.snapshot())
    }

    /// Receives a snapshot after every merge and reset for `service`.
    ///
    /// The receiver's current value is the latest snapshot.
    pub fn subscribe(
        &self,
        service: Service,
    ) -> Result<watch::Receiver<PlaylistSnapshot>, RepositoryError> {
        Ok(self.entry(service)?.cache.subscribe())
    }

    /// Whether a load is in flight for `service`.
    pub fn is_loading(&self, service: Service) -> Result<bool, RepositoryError> {
        Ok(self.entry(service)?.cache.is_loading())
    }

    /// Whether displaying row `index` should trigger a load.
    pub fn should_load_more(
        &self,
        service: Service,
        index: usize,
        threshold: usize,
    ) -> Result<bool, RepositoryError> {
        let cache = &self.entry(service)?.cache;
        let snapshot = cache.snapshot();
        Ok(should_load_more(
            index,
            snapshot.len(),
            threshold,
            snapshot.can_load_more(),
            cache.is_loading(),
        ))
    }
}
