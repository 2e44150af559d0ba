//! Paginated playlist repository.
//!
//! [`RemotePlaylistRepository`] is the entry point for list views: it loads
//! pages on demand, publishes [`PlaylistSnapshot`](crate::playlist::PlaylistSnapshot)s,
//! and answers whether a displayed row should trigger the next page.
//!
//! ```ignore
//! use songcapture::repository::{RemotePlaylistRepository, RepositoryConfig};
//!
//! let repo = RemotePlaylistRepository::new(providers, RepositoryConfig::default());
//! repo.load_more(Service::AppleMusic).await?;
//! let snapshot = repo.current_snapshot(Service::AppleMusic)?;
//! ```

mod remote;

pub use crate::cache::SkipReason;
pub use remote::{
    LoadOutcome, RemotePlaylistRepository, RepositoryConfig, RepositoryError, DEFAULT_PAGE_SIZE,
};
