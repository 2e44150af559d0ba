//! Immutable point-in-time view of a paginated playlist collection.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Playlist, PlaylistId};

/// What the UI should currently render for one service.
///
/// Snapshots share their storage with the cache that produced them, so
/// cloning is cheap. The cache copies on write, so a snapshot never changes
/// after it has been handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSnapshot {
    ordered_ids: Arc<Vec<PlaylistId>>,
    by_id: Arc<HashMap<PlaylistId, Playlist>>,
    can_load_more: bool,
}

impl PlaylistSnapshot {
    pub(crate) fn new(
        ordered_ids: Arc<Vec<PlaylistId>>,
        by_id: Arc<HashMap<PlaylistId, Playlist>>,
        can_load_more: bool,
    ) -> Self {
        Self {
            ordered_ids,
            by_id,
            can_load_more,
        }
    }

    /// A snapshot with no rows.
    pub fn empty(can_load_more: bool) -> Self {
        Self::new(Arc::default(), Arc::default(), can_load_more)
    }

    /// Row identities in render order.
    pub fn ordered_ids(&self) -> &[PlaylistId] {
        &self.ordered_ids
    }

    /// Lookup from identity to the latest known playlist.
    pub fn by_id(&self) -> &HashMap<PlaylistId, Playlist> {
        &self.by_id
    }

    /// Whether the provider may have more pages.
    pub fn can_load_more(&self) -> bool {
        self.can_load_more
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ordered_ids.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }

    /// Looks up a playlist by identity.
    pub fn get(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.by_id.get(id)
    }

    /// The playlist rendered at `index`.
    pub fn playlist_at(&self, index: usize) -> Option<&Playlist> {
        self.ordered_ids.get(index).and_then(|id| self.by_id.get(id))
    }

    /// Playlists in render order.
    pub fn iter(&self) -> impl Iterator<Item = &Playlist> + '_ {
        self.ordered_ids.iter().filter_map(|id| self.by_id.get(id))
    }
}

impl Default for PlaylistSnapshot {
    fn default() -> Self {
        Self::empty(true)
    }
}
