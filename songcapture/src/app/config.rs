//! Application configuration for SongCaptureApp.
//!
//! `AppConfig` gathers everything needed to wire the application: which
//! providers to create, how pages are sized and prefetched, and how artwork
//! is cached.

use crate::artwork::ArtworkConfig;
use crate::config::ConfigFile;
use crate::prefetch::PrefetchConfig;
use crate::provider::{AppleMusicCredentials, ProviderConfig, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::repository::RepositoryConfig;

/// Application configuration combining all component configs.
///
/// This is the top-level configuration passed to `SongCaptureApp::start()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// One entry per service to expose.
    pub providers: Vec<ProviderConfig>,

    pub repository: RepositoryConfig,

    pub prefetch: PrefetchConfig,

    pub artwork: ArtworkConfig,

    /// Timeout for every HTTP request, in seconds.
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// Create a config for `providers` with default tuning.
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        Self {
            providers,
            repository: RepositoryConfig::default(),
            prefetch: PrefetchConfig::default(),
            artwork: ArtworkConfig::default(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }

    /// Create application config from the configuration file.
    ///
    /// Both services are always configured. Apple Music without tokens still
    /// registers, and its loads fail with an authorization error that names
    /// the missing setting.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let apple = &config.apple_music;
        let credentials = AppleMusicCredentials::new(
            apple.developer_token.clone().unwrap_or_default(),
            apple.user_token.clone().unwrap_or_default(),
        );

        Self {
            providers: vec![
                ProviderConfig::AppleMusic {
                    credentials,
                    base_url: apple.base_url.clone(),
                    artwork_size: apple.artwork_size,
                },
                ProviderConfig::spotify(),
            ],
            repository: RepositoryConfig {
                page_size: config.pagination.page_size,
            },
            prefetch: PrefetchConfig::with_threshold(config.pagination.prefetch_threshold),
            artwork: ArtworkConfig::default()
                .with_memory_size(config.artwork.memory_size as u64)
                .with_asset_root(config.artwork.asset_directory.clone())
                .with_max_edge(config.artwork.max_edge),
            http_timeout_secs: config.http.timeout_secs,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.repository.page_size = page_size;
        self
    }

    pub fn with_prefetch_threshold(mut self, threshold: usize) -> Self {
        self.prefetch.threshold = threshold;
        self
    }

    pub fn with_artwork(mut self, artwork: ArtworkConfig) -> Self {
        self.artwork = artwork;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_config_file(&ConfigFile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::Service;

    #[test]
    fn test_from_default_config_file() {
        let config = AppConfig::default();
        let services: Vec<_> = config.providers.iter().map(|p| p.service()).collect();
        assert_eq!(services, vec![Service::AppleMusic, Service::Spotify]);
        assert_eq!(config.repository.page_size, 25);
        assert_eq!(config.prefetch.threshold, 10);
        assert_eq!(config.artwork.memory_size, 64 * 1024 * 1024);
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_from_config_file_carries_overrides() {
        let file = ConfigFile::parse(
            "[apple_music]\ndeveloper_token = d\nuser_token = u\nbase_url = http://localhost:9000\n\
             [pagination]\npage_size = 10\nprefetch_threshold = 3\n[artwork]\nmax_edge = 128\n",
        )
        .unwrap();
        let config = AppConfig::from_config_file(&file);

        match &config.providers[0] {
            ProviderConfig::AppleMusic {
                credentials,
                base_url,
                ..
            } => {
                assert!(credentials.is_complete());
                assert_eq!(base_url, "http://localhost:9000");
            }
            other => panic!("expected Apple Music, got {:?}", other),
        }
        assert_eq!(config.repository.page_size, 10);
        assert_eq!(config.prefetch.threshold, 3);
        assert_eq!(config.artwork.max_edge, Some(128));
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::new(vec![ProviderConfig::spotify()])
            .with_page_size(5)
            .with_prefetch_threshold(2);
        assert_eq!(config.repository.page_size, 5);
        assert_eq!(config.prefetch.threshold, 2);
    }
}
