//! Spotify playlists provider.
//!
//! Spotify pagination is not wired up yet. This provider is a real variant
//! rather than a special case in the cache: every fetch answers with an
//! empty page that already marks the collection as exhausted, so a single
//! load settles the cache into its terminal state.

use futures::future::BoxFuture;
use tracing::debug;

use crate::playlist::{PlaylistPage, Service};
use crate::provider::{PlaylistProvider, ProviderError};

/// Stub provider for Spotify.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpotifyProvider;

impl SpotifyProvider {
    pub fn new() -> Self {
        Self
    }
}

impl PlaylistProvider for SpotifyProvider {
    fn service(&self) -> Service {
        Service::Spotify
    }

    fn fetch_first_page(&self, limit: usize) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>> {
        self.fetch_next_page(limit, None)
    }

    fn fetch_next_page(
        &self,
        limit: usize,
        _continuation_token: Option<String>,
    ) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>> {
        Box::pin(async move {
            debug!(limit, "Spotify pagination unavailable, returning exhausted page");
            Ok(PlaylistPage::exhausted())
        })
    }
}
