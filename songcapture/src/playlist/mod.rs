//! Playlist domain model.
//!
//! - [`PlaylistId`]: composite (service, raw id) identity
//! - [`PlaylistPage`]: one provider fetch result
//! - [`PlaylistSnapshot`]: immutable render view of a merged collection

mod page;
mod snapshot;
mod types;

pub use page::PlaylistPage;
pub use snapshot::PlaylistSnapshot;
pub use types::{Playlist, PlaylistGroup, PlaylistGroupId, PlaylistId, Service};
