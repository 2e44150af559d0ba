//! Core provider trait and error type.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::playlist::{PlaylistPage, Service};

/// Errors that can occur while fetching from a remote provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport-level failure (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Credentials are missing or were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The response body could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A remote source of one user's playlists, fetched page by page.
///
/// Continuation tokens are opaque to callers: whatever a provider returns in
/// [`PlaylistPage::continuation_token`] is handed back verbatim on the next
/// call. Only the provider knows what it encodes (an offset, a cursor, ...).
///
/// # Dyn Compatibility
///
/// Methods return boxed futures so that heterogeneous providers can be held
/// as `Arc<dyn PlaylistProvider>` and selected by [`Service`] at runtime.
pub trait PlaylistProvider: Send + Sync {
    /// The service this provider talks to.
    fn service(&self) -> Service;

    /// Human-readable provider name.
    fn name(&self) -> &str {
        self.service().title()
    }

    /// Fetches the first page of the collection.
    fn fetch_first_page(&self, limit: usize) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>>;

    /// Fetches the page following `continuation_token`.
    ///
    /// An absent token means "from the beginning".
    fn fetch_next_page(
        &self,
        limit: usize,
        continuation_token: Option<String>,
    ) -> BoxFuture<'_, Result<PlaylistPage, ProviderError>>;
}
