//! Row-display hook that spawns page loads.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::playlist::Service;
use crate::prefetch::PrefetchConfig;
use crate::repository::{LoadOutcome, RemotePlaylistRepository, RepositoryError};

/// Applies the prefetch rule for one service.
///
/// Cheap to clone; each list view holds its own.
#[derive(Clone)]
pub struct PrefetchTrigger {
    repository: Arc<RemotePlaylistRepository>,
    service: Service,
    config: PrefetchConfig,
}

impl PrefetchTrigger {
    pub fn new(
        repository: Arc<RemotePlaylistRepository>,
        service: Service,
        config: PrefetchConfig,
    ) -> Self {
        Self {
            repository,
            service,
            config,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn config(&self) -> &PrefetchConfig {
        &self.config
    }

    /// Whether displaying row `index` would trigger a load right now.
    pub fn should_trigger(&self, index: usize) -> bool {
        self.repository
            .should_load_more(self.service, index, self.config.threshold)
            .unwrap_or(false)
    }

    /// Reports that row `index` was displayed.
    ///
    /// Spawns a background load when the row is near the end. Failures are
    /// logged; the next displayed row retries. Must be called from within a
    /// Tokio runtime.
    pub fn on_row_displayed(
        &self,
        index: usize,
    ) -> Option<JoinHandle<Result<LoadOutcome, RepositoryError>>> {
        if !self.should_trigger(index) {
            return None;
        }

        debug!(service = %self.service, index, "Prefetching next playlist page");
        let repository = Arc::clone(&self.repository);
        let service = self.service;
        Some(tokio::spawn(async move {
            let result = repository.load_more(service).await;
            if let Err(e) = &result {
                warn!(service = %service, error = %e, "Prefetch load failed");
            }
            result
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SkipReason;
    use crate::playlist::{Playlist, PlaylistId, PlaylistPage};
    use crate::provider::{PlaylistProvider, ProviderError};
    use crate::repository::RepositoryConfig;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Serves numbered pages forever; next-page fetches wait on `gate` if set.
    struct CountingProvider {
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl CountingProvider {
        fn page(&self, offset: usize, limit: usize) -> PlaylistPage {
            let items = (offset..offset + limit)
                .map(|i| Playlist::new(PlaylistId::new(Service::AppleMusic, format!("p{i}")), "x"))
                .collect();
            PlaylistPage::new(items, Some((offset + limit).to_string()), false)
        }
    }

    impl PlaylistProvider for CountingProvider {
        fn service(&self) -> Service {
            Service::AppleMusic
        }

        fn fetch_first_page(
            &self,
            limit: usize,
        ) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(self.page(0, limit)) })
        }

        fn fetch_next_page(
            &self,
            limit: usize,
            continuation_token: Option<String>,
        ) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let offset = continuation_token
                .and_then(|t| t.parse().ok())
                .unwrap_or(0);
            Box::pin(async move {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                Ok(self.page(offset, limit))
            })
        }
    }

    async fn loaded_trigger() -> (PrefetchTrigger, Arc<CountingProvider>) {
        gated_trigger(None).await
    }

    async fn gated_trigger(
        gate: Option<Arc<Notify>>,
    ) -> (PrefetchTrigger, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            gate,
        });
        let dyn_provider: Arc<dyn PlaylistProvider> = provider.clone();
        let repository = Arc::new(RemotePlaylistRepository::new(
            vec![dyn_provider],
            RepositoryConfig::default(),
        ));
        repository.load_more(Service::AppleMusic).await.unwrap();
        let trigger =
            PrefetchTrigger::new(repository, Service::AppleMusic, PrefetchConfig::default());
        (trigger, provider)
    }

    #[tokio::test]
    async fn test_row_fourteen_does_not_trigger() {
        let (trigger, provider) = loaded_trigger().await;
        assert!(trigger.on_row_displayed(14).is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_row_fifteen_triggers_one_load() {
        let (trigger, provider) = loaded_trigger().await;

        let handle = trigger.on_row_displayed(15).expect("row 15 should trigger");
        let outcome = handle.await.unwrap().unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                new_items: 25,
                can_load_more: true
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(!trigger.should_trigger(15));
        assert!(trigger.should_trigger(40));
    }

    #[tokio::test]
    async fn test_burst_of_rows_fetches_once() {
        let gate = Arc::new(Notify::new());
        let (trigger, provider) = gated_trigger(Some(Arc::clone(&gate))).await;

        let handle = trigger.on_row_displayed(15).expect("row 15 should trigger");
        while provider.calls.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        let extra: Vec<_> = (16..25).filter_map(|i| trigger.on_row_displayed(i)).collect();
        assert!(extra.is_empty());

        gate.notify_one();
        assert!(handle.await.unwrap().unwrap().is_loaded());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_skipped_outcome_when_exhausted() {
        let repository = Arc::new(RemotePlaylistRepository::new(
            vec![Arc::new(crate::provider::SpotifyProvider::new())],
            RepositoryConfig::default(),
        ));
        repository.load_more(Service::Spotify).await.unwrap();
        let trigger = PrefetchTrigger::new(repository, Service::Spotify, PrefetchConfig::default());

        assert!(trigger.on_row_displayed(0).is_none());
        assert!(matches!(
            trigger.repository.load_more(Service::Spotify).await,
            Ok(LoadOutcome::Skipped(SkipReason::Exhausted))
        ));
    }
}
