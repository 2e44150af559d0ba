//! Apple Music library playlists provider.
//!
//! Reads the signed-in user's library playlists through the Apple Music API:
//!
//! ```text
//! GET {base}/v1/me/library/playlists?limit={limit}&offset={offset}
//! Authorization: Bearer {developer_token}
//! Music-User-Token: {user_token}
//! ```
//!
//! # Continuation Tokens
//!
//! The endpoint is offset-based. The continuation token handed out by this
//! provider is the decimal offset of the next page; a missing or unparsable
//! token restarts from offset 0. A page shorter than the requested limit is
//! treated as the end of the collection.
//!
//! # Artwork
//!
//! Artwork URLs are templates containing `{w}` and `{h}` placeholders. They
//! are filled with the configured edge size so every playlist carries a
//! directly fetchable locator.

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::debug;

use crate::playlist::{Playlist, PlaylistId, PlaylistPage, Service};
use crate::provider::{AsyncHttpClient, PlaylistProvider, ProviderError};

/// Public Apple Music API host.
pub const DEFAULT_APPLE_MUSIC_BASE_URL: &str = "https://api.music.apple.com";

/// Default artwork edge length in pixels.
pub const DEFAULT_ARTWORK_SIZE: u32 = 300;

/// Largest page the library endpoint accepts.
pub const MAX_PAGE_LIMIT: usize = 100;

const LIBRARY_PLAYLISTS_PATH: &str = "/v1/me/library/playlists";

/// Tokens required by the Apple Music API.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AppleMusicCredentials {
    /// Developer (JWT) token identifying the application.
    pub developer_token: String,
    /// Music user token identifying the signed-in user.
    pub user_token: String,
}

impl AppleMusicCredentials {
    pub fn new(developer_token: impl Into<String>, user_token: impl Into<String>) -> Self {
        Self {
            developer_token: developer_token.into(),
            user_token: user_token.into(),
        }
    }

    /// True when both tokens are present.
    pub fn is_complete(&self) -> bool {
        !self.developer_token.trim().is_empty() && !self.user_token.trim().is_empty()
    }
}

// Tokens must never end up in logs.
impl std::fmt::Debug for AppleMusicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppleMusicCredentials")
            .field("developer_token", &"<redacted>")
            .field("user_token", &"<redacted>")
            .finish()
    }
}

/// Apple Music library playlists provider.
///
/// # Example
///
/// ```no_run
/// use songcapture::provider::{AppleMusicCredentials, AppleMusicProvider, AsyncReqwestClient};
///
/// let client = AsyncReqwestClient::new().unwrap();
/// let credentials = AppleMusicCredentials::new("DEV_TOKEN", "USER_TOKEN");
/// let provider = AppleMusicProvider::new(client, credentials);
/// ```
pub struct AppleMusicProvider<C: AsyncHttpClient> {
    http_client: C,
    credentials: AppleMusicCredentials,
    base_url: String,
    artwork_size: u32,
}

impl<C: AsyncHttpClient> AppleMusicProvider<C> {
    /// Creates a provider against the public API host.
    pub fn new(http_client: C, credentials: AppleMusicCredentials) -> Self {
        Self {
            http_client,
            credentials,
            base_url: DEFAULT_APPLE_MUSIC_BASE_URL.to_string(),
            artwork_size: DEFAULT_ARTWORK_SIZE,
        }
    }

    /// Overrides the API host (useful for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the edge length substituted into artwork templates.
    pub fn with_artwork_size(mut self, size: u32) -> Self {
        self.artwork_size = size.max(1);
        self
    }

    fn build_url(&self, limit: usize, offset: usize) -> String {
        format!(
            "{}{}?limit={}&offset={}",
            self.base_url, LIBRARY_PLAYLISTS_PATH, limit, offset
        )
    }

    async fn fetch_page(&self, limit: usize, offset: usize) -> Result<PlaylistPage, ProviderError> {
        if !self.credentials.is_complete() {
            return Err(ProviderError::Unauthorized(
                "Apple Music developer and user tokens are required".to_string(),
            ));
        }

        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let url = self.build_url(limit, offset);
        let authorization = format!("Bearer {}", self.credentials.developer_token);
        let headers = [
            ("Authorization", authorization.as_str()),
            ("Music-User-Token", self.credentials.user_token.as_str()),
        ];

        debug!(limit, offset, "Fetching Apple Music library playlists");
        let body = self.http_client.get(&url, &headers).await?;

        let response: LibraryPlaylistsResponse = serde_json::from_slice(&body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let items: Vec<Playlist> = response
            .data
            .into_iter()
            .map(|resource| resource.into_playlist(self.artwork_size))
            .collect();

        Ok(page_from_offset(items, limit, offset))
    }
}

/// Builds a page using the offset-token convention.
fn page_from_offset(items: Vec<Playlist>, limit: usize, offset: usize) -> PlaylistPage {
    // An offset past `usize::MAX` cannot be requested, so that ends the collection too.
    let next = match offset.checked_add(limit) {
        Some(next) if items.len() >= limit => Some(next.to_string()),
        _ => None,
    };
    let reached_end = next.is_none();
    PlaylistPage::new(items, next, reached_end)
}

/// Decodes an offset token; anything unusable means "start over".
fn parse_offset(token: Option<&str>) -> usize {
    token.and_then(|t| t.trim().parse().ok()).unwrap_or(0)
}

fn fill_artwork_template(template: &str, size: u32) -> String {
    let size = size.to_string();
    template.replace("{w}", &size).replace("{h}", &size)
}

impl<C: AsyncHttpClient> PlaylistProvider for AppleMusicProvider<C> {
    fn service(&self) -> Service {
        Service::AppleMusic
    }

    fn fetch_first_page(&self, limit: usize) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>> {
        Box::pin(async move { self.fetch_page(limit, 0).await })
    }

    fn fetch_next_page(
        &self,
        limit: usize,
        continuation_token: Option<String>,
    ) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>> {
        let offset = parse_offset(continuation_token.as_deref());
        Box::pin(async move { self.fetch_page(limit, offset).await })
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct LibraryPlaylistsResponse {
    #[serde(default)]
    data: Vec<LibraryPlaylistResource>,
}

#[derive(Debug, Deserialize)]
struct LibraryPlaylistResource {
    id: String,
    #[serde(default)]
    attributes: Option<LibraryPlaylistAttributes>,
}

#[derive(Debug, Deserialize)]
struct LibraryPlaylistAttributes {
    #[serde(default)]
    name: String,
    #[serde(default)]
    artwork: Option<ArtworkAttributes>,
}

#[derive(Debug, Deserialize)]
struct ArtworkAttributes {
    url: String,
}

impl LibraryPlaylistResource {
    fn into_playlist(self, artwork_size: u32) -> Playlist {
        let (name, artwork) = match self.attributes {
            Some(attrs) => (
                attrs.name,
                attrs
                    .artwork
                    .map(|a| fill_artwork_template(&a.url, artwork_size)),
            ),
            None => (String::new(), None),
        };
        Playlist {
            id: PlaylistId::new(Service::AppleMusic, self.id),
            name,
            artwork,
        }
    }
}
