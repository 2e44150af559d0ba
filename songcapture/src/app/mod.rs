//! Application bootstrap.
//!
//! This module provides the `SongCaptureApp` type, which builds every
//! service from one [`AppConfig`] so front ends do not wire providers,
//! caches and loaders by hand.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      SongCaptureApp                       │
//! │                                                           │
//! │  AsyncReqwestClient ──┬──► ProviderFactory ──► providers  │
//! │                       │                          │        │
//! │                       │      RemotePlaylistRepository ◄───┘
//! │                       │            │                      │
//! │                       │            └──► PrefetchTrigger   │
//! │                       │                                   │
//! │                       └──► ArtworkLoader                  │
//! │                                                           │
//! │  LibraryStore, SelectionStore                             │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::SongCaptureApp;
pub use config::AppConfig;
pub use error::AppError;
