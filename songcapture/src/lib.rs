//! SongCapture - Remote playlist paging and artwork caching
//!
//! This library provides the core functionality for browsing a user's
//! playlists on remote music services one page at a time, prefetching the
//! next page as the user scrolls, and resolving playlist artwork through a
//! shared in-memory cache that coalesces concurrent requests.
//!
//! # Modules
//!
//! - [`playlist`]: playlist records, pages and immutable snapshots
//! - [`provider`]: per-service page fetchers over an async HTTP client
//! - [`cache`]: the per-service pagination cache and the weighted memory cache
//! - [`repository`]: single-flight page loading per service
//! - [`prefetch`]: the scroll-position trigger for loading the next page
//! - [`artwork`]: request-coalescing artwork resolution
//! - [`library`]: saved playlists, groups and the current selection
//! - [`config`]: the `~/.songcapture/config.ini` file
//! - [`logging`]: tracing subscriber setup
//! - [`app`]: wiring everything from one configuration

pub mod app;
pub mod artwork;
pub mod cache;
pub mod config;
pub mod library;
pub mod logging;
pub mod playlist;
pub mod prefetch;
pub mod provider;
pub mod repository;
