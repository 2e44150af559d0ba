//! Local playlist library.
//!
//! - [`LibraryStore`]: saved playlists and groups for the session
//! - [`SelectionStore`]: the playlists currently ticked in the picker

mod selection;
mod store;

pub use selection::{SelectionObserver, SelectionStore};
pub use store::LibraryStore;
