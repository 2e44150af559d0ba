//! Observable set of selected playlists.

use std::collections::HashSet;

use tokio::sync::watch;

use crate::playlist::PlaylistId;

/// The set of playlists the user has ticked.
///
/// Every change is broadcast to all observers. Observers only ever see the
/// latest selection, not each intermediate step.
#[derive(Debug)]
pub struct SelectionStore {
    sender: watch::Sender<HashSet<PlaylistId>>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::with_selection(HashSet::new())
    }

    pub fn with_selection(selection: HashSet<PlaylistId>) -> Self {
        let (sender, _) = watch::channel(selection);
        Self { sender }
    }

    /// Registers an observer. Its current value is the selection right now.
    pub fn add_observer(&self) -> SelectionObserver {
        SelectionObserver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Unregisters an observer.
    pub fn remove_observer(&self, observer: SelectionObserver) {
        drop(observer);
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn is_selected(&self, id: &PlaylistId) -> bool {
        self.sender.borrow().contains(id)
    }

    /// Flips `id`; returns whether it is now selected.
    pub fn toggle(&self, id: &PlaylistId) -> bool {
        let mut now_selected = false;
        self.sender.send_modify(|selection| {
            now_selected = if selection.remove(id) {
                false
            } else {
                selection.insert(id.clone())
            };
        });
        now_selected
    }

    /// Selects or deselects `id`; observers are only notified on change.
    pub fn set_selected(&self, id: &PlaylistId, selected: bool) {
        self.sender.send_if_modified(|selection| {
            if selected {
                selection.insert(id.clone())
            } else {
                selection.remove(id)
            }
        });
    }

    /// Replaces the whole selection. Observers hear about it only when the
    /// set actually differs.
    pub fn replace(&self, selection: HashSet<PlaylistId>) {
        self.sender.send_if_modified(|current| {
            if *current == selection {
                return false;
            }
            *current = selection;
            true
        });
    }

    pub fn clear(&self) {
        self.sender.send_if_modified(|selection| {
            let changed = !selection.is_empty();
            selection.clear();
            changed
        });
    }

    /// Copy of the current selection.
    pub fn selected(&self) -> HashSet<PlaylistId> {
        self.sender.borrow().clone()
    }
}

/// Handle returned by [`SelectionStore::add_observer`].
#[derive(Debug)]
pub struct SelectionObserver {
    receiver: watch::Receiver<HashSet<PlaylistId>>,
}

impl SelectionObserver {
    /// The latest selection.
    pub fn current(&mut self) -> HashSet<PlaylistId> {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next change; `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<HashSet<PlaylistId>> {
        self.receiver.changed().await.ok()?;
        Some(self.current())
    }
}
