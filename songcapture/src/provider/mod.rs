//! Remote playlist provider abstraction
//!
//! This module provides the [`PlaylistProvider`] trait and implementations
//! for fetching a user's playlists page by page from remote music services.
//!
//! # Factory Pattern
//!
//! For centralized provider creation, use the [`ProviderFactory`]:
//!
//! ```ignore
//! use songcapture::provider::{ProviderFactory, ProviderConfig, AsyncReqwestClient};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let factory = ProviderFactory::new(http_client);
//! let provider = factory.create(&ProviderConfig::spotify());
//! ```

mod apple_music;
mod factory;
mod http;
mod spotify;
mod types;

pub use apple_music::{
    AppleMusicCredentials, AppleMusicProvider, DEFAULT_APPLE_MUSIC_BASE_URL,
    DEFAULT_ARTWORK_SIZE, MAX_PAGE_LIMIT,
};
pub use factory::{ProviderConfig, ProviderFactory};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_HTTP_TIMEOUT_SECS};
pub use spotify::SpotifyProvider;
pub use types::{PlaylistProvider, ProviderError};

#[cfg(test)]
pub use http::tests::{MockAsyncHttpClient, RecordedRequest};
