//! CLI command implementations.

pub mod artwork;
pub mod common;
pub mod config;
pub mod playlists;
