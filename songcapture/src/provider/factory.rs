//! Provider construction from configuration.

use std::sync::Arc;

use crate::playlist::Service;
use crate::provider::{
    AppleMusicCredentials, AppleMusicProvider, AsyncHttpClient, PlaylistProvider,
    SpotifyProvider, DEFAULT_APPLE_MUSIC_BASE_URL, DEFAULT_ARTWORK_SIZE,
};

/// Configuration for one playlist provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// Apple Music library playlists.
    AppleMusic {
        credentials: AppleMusicCredentials,
        base_url: String,
        artwork_size: u32,
    },
    /// Spotify stub.
    Spotify,
}

impl ProviderConfig {
    /// Apple Music against the public API host.
    pub fn apple_music(credentials: AppleMusicCredentials) -> Self {
        ProviderConfig::AppleMusic {
            credentials,
            base_url: DEFAULT_APPLE_MUSIC_BASE_URL.to_string(),
            artwork_size: DEFAULT_ARTWORK_SIZE,
        }
    }

    /// The Spotify stub.
    pub fn spotify() -> Self {
        ProviderConfig::Spotify
    }

    /// The service this config produces a provider for.
    pub fn service(&self) -> Service {
        match self {
            ProviderConfig::AppleMusic { .. } => Service::AppleMusic,
            ProviderConfig::Spotify => Service::Spotify,
        }
    }

    /// Human-readable provider name.
    pub fn name(&self) -> &'static str {
        self.service().title()
    }
}

/// Builds providers that share one HTTP client.
pub struct ProviderFactory<C> {
    http_client: C,
}

impl<C> ProviderFactory<C>
where
    C: AsyncHttpClient + Clone + 'static,
{
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Creates the provider described by `config`.
    pub fn create(&self, config: &ProviderConfig) -> Arc<dyn PlaylistProvider> {
        match config {
            ProviderConfig::AppleMusic {
                credentials,
                base_url,
                artwork_size,
            } => Arc::new(
                AppleMusicProvider::new(self.http_client.clone(), credentials.clone())
                    .with_base_url(base_url.clone())
                    .with_artwork_size(*artwork_size),
            ),
            ProviderConfig::Spotify => Arc::new(SpotifyProvider::new()),
        }
    }

    /// Creates every configured provider.
    pub fn create_all(&self, configs: &[ProviderConfig]) -> Vec<Arc<dyn PlaylistProvider>> {
        configs.iter().map(|c| self.create(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::AsyncReqwestClient;

    #[test]
    fn test_config_service_mapping() {
        let apple = ProviderConfig::apple_music(AppleMusicCredentials::new("d", "u"));
        assert_eq!(apple.service(), Service::AppleMusic);
        assert_eq!(apple.name(), "Apple Music");
        assert_eq!(ProviderConfig::spotify().service(), Service::Spotify);
    }

    #[test]
    fn test_factory_creates_matching_services() {
        let factory = ProviderFactory::new(AsyncReqwestClient::new().unwrap());
        let providers = factory.create_all(&[
            ProviderConfig::apple_music(AppleMusicCredentials::new("d", "u")),
            ProviderConfig::spotify(),
        ]);

        let services: Vec<_> = providers.iter().map(|p| p.service()).collect();
        assert_eq!(services, vec![Service::AppleMusic, Service::Spotify]);
    }
}
