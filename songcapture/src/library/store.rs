//! In-memory store for saved playlists and groups.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use tracing::debug;

use crate::playlist::{Playlist, PlaylistGroup, PlaylistGroupId, PlaylistId, PlaylistSnapshot};

#[derive(Debug, Default)]
struct LibraryState {
    playlists: HashMap<PlaylistId, Playlist>,
    groups: HashMap<PlaylistGroupId, PlaylistGroup>,
}

/// Saved playlists and playlist groups.
///
/// Lives for the process only. Saving an existing id replaces it.
#[derive(Debug, Default)]
pub struct LibraryStore {
    state: RwLock<LibraryState>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_playlist(&self, playlist: Playlist) {
        debug!(id = %playlist.id, name = %playlist.name, "Saving playlist");
        self.state
            .write()
            .playlists
            .insert(playlist.id.clone(), playlist);
    }

    pub fn save_playlists(&self, playlists: impl IntoIterator<Item = Playlist>) {
        let mut state = self.state.write();
        for playlist in playlists {
            state.playlists.insert(playlist.id.clone(), playlist);
        }
    }

    /// Saves the selected rows of `snapshot`; returns how many were saved.
    pub fn save_selected(&self, selected: &HashSet<PlaylistId>, snapshot: &PlaylistSnapshot) -> usize {
        let chosen: Vec<Playlist> = snapshot
            .iter()
            .filter(|p| selected.contains(&p.id))
            .cloned()
            .collect();
        let count = chosen.len();
        self.save_playlists(chosen);
        debug!(count, "Saved selected playlists");
        count
    }

    pub fn save_group(&self, group: PlaylistGroup) {
        debug!(id = group.id.value(), name = %group.name, "Saving playlist group");
        self.state.write().groups.insert(group.id, group);
    }

    pub fn playlist(&self, id: &PlaylistId) -> Option<Playlist> {
        self.state.read().playlists.get(id).cloned()
    }

    pub fn group(&self, id: PlaylistGroupId) -> Option<PlaylistGroup> {
        self.state.read().groups.get(&id).cloned()
    }

    pub fn remove_group(&self, id: PlaylistGroupId) -> Option<PlaylistGroup> {
        self.state.write().groups.remove(&id)
    }

    /// Looks up `ids` in order, skipping ids that were never saved.
    pub fn playlists(&self, ids: &[PlaylistId]) -> Vec<Playlist> {
        let state = self.state.read();
        ids.iter()
            .filter_map(|id| state.playlists.get(id).cloned())
            .collect()
    }

    /// All saved playlists sorted by name, then id.
    pub fn all_playlists(&self) -> Vec<Playlist> {
        let mut playlists: Vec<Playlist> = self.state.read().playlists.values().cloned().collect();
        playlists.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        playlists
    }

    /// All saved groups sorted by name, then id.
    pub fn all_groups(&self) -> Vec<PlaylistGroup> {
        let mut groups: Vec<PlaylistGroup> = self.state.read().groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        groups
    }

    /// Playlists and groups in one consistent read.
    pub fn playlists_and_groups(&self) -> (Vec<Playlist>, Vec<PlaylistGroup>) {
        let state = self.state.read();
        let mut playlists: Vec<Playlist> = state.playlists.values().cloned().collect();
        let mut groups: Vec<PlaylistGroup> = state.groups.values().cloned().collect();
        drop(state);
        playlists.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        (playlists, groups)
    }
}
