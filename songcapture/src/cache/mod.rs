//! Caching layers.
//!
//! - [`RemotePlaylistCache`]: merged, deduplicated view of a paginated
//!   playlist collection, with single-flight load admission
//! - [`MemoryCache`]: byte-bounded LRU store used for decoded artwork

mod memory;
mod remote;

pub use memory::{CacheStats, MemoryCache, Weighted};
pub use remote::{
    FetchMode, LoadAdmission, LoadTicket, MergeOutcome, RemotePlaylistCache, SkipReason,
};
