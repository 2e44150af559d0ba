//! A single page of results from a playlist provider.

use super::Playlist;

/// One batch of playlists returned by a provider.
///
/// The continuation token is opaque: only the provider that issued it knows
/// how to interpret it. Caches store it and hand it back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistPage {
    /// Playlists in remote order.
    pub items: Vec<Playlist>,
    /// Token to present when requesting the following page.
    pub continuation_token: Option<String>,
    /// True when this page reached the end of the remote collection.
    pub is_last_page: bool,
}

impl PlaylistPage {
    /// Creates a page.
    pub fn new(
        items: Vec<Playlist>,
        continuation_token: Option<String>,
        is_last_page: bool,
    ) -> Self {
        Self {
            items,
            continuation_token,
            is_last_page,
        }
    }

    /// An empty page that marks the collection as exhausted.
    pub fn exhausted() -> Self {
        Self {
            items: Vec::new(),
            continuation_token: None,
            is_last_page: true,
        }
    }

    /// Number of playlists on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the page carries no playlists.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
