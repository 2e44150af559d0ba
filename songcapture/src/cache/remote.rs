//! Paginated remote playlist cache.
//!
//! [`RemotePlaylistCache`] holds the merged view of every page fetched so far
//! for one service. All state lives behind a single mutex that is never held
//! across an `.await`, so each operation is atomic with respect to the others
//! and readers never observe a partially merged page.
//!
//! # Merge Semantics
//!
//! - **Position is first-write-wins**: an identity keeps the slot it was first
//!   appended to, no matter how many later pages repeat it.
//! - **Attributes are last-write-wins**: a repeated identity replaces the
//!   stored playlist, so refreshed names or artwork land in place.
//! - **End of data is sticky**: once a page reports `is_last_page`, the cache
//!   stays exhausted until [`reset`](RemotePlaylistCache::reset).
//!
//! # Single Flight
//!
//! Loads are admitted through [`try_begin_load`](RemotePlaylistCache::try_begin_load),
//! which checks and sets the loading flag in one critical section and hands
//! back a [`LoadTicket`]. Dropping the ticket clears the flag, so success,
//! error, and cancellation of the owning future all release it.
//!
//! # Epochs
//!
//! Every reset bumps an epoch. A ticket remembers the epoch it was issued in;
//! pages delivered against a stale ticket are discarded, and a stale ticket
//! never clears the loading flag of a newer load.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::playlist::{Playlist, PlaylistId, PlaylistPage, PlaylistSnapshot, Service};

/// Why a load request did not reach the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another load for the same service is in flight.
    InFlight,
    /// The provider already reported the end of the collection.
    Exhausted,
    /// The cache was reset while the page was being fetched.
    Superseded,
}

/// Which provider operation a load should call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Nothing fetched yet: bootstrap with the first page.
    FirstPage,
    /// Continue from the stored token.
    NextPage(Option<String>),
}

/// Result of asking the cache to admit a load.
#[derive(Debug)]
pub enum LoadAdmission {
    Admitted(LoadTicket),
    Skipped(SkipReason),
}

/// Result of merging a page through a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The page was applied.
    Applied { new_items: usize, can_load_more: bool },
    /// The cache was reset after the ticket was issued; the page was dropped.
    Superseded,
}

#[derive(Debug)]
struct CacheState {
    ordered_ids: Arc<Vec<PlaylistId>>,
    by_id: Arc<HashMap<PlaylistId, Playlist>>,
    seen: HashSet<PlaylistId>,
    continuation_token: Option<String>,
    can_load_more: bool,
    is_loading: bool,
    epoch: u64,
}

impl CacheState {
    fn new() -> Self {
        Self {
            ordered_ids: Arc::default(),
            by_id: Arc::default(),
            seen: HashSet::new(),
            continuation_token: None,
            can_load_more: true,
            is_loading: false,
            epoch: 0,
        }
    }

    fn reset(&mut self) {
        let epoch = self.epoch.wrapping_add(1);
        *self = Self::new();
        self.epoch = epoch;
    }

    /// Applies a page; returns the number of newly appended identities.
    fn merge(&mut self, page: PlaylistPage) -> usize {
        let mut new_items = 0;
        // Copy-on-write: only clones if a snapshot still shares the storage.
        let ordered_ids = Arc::make_mut(&mut self.ordered_ids);
        let by_id = Arc::make_mut(&mut self.by_id);

        for playlist in page.items {
            if self.seen.insert(playlist.id.clone()) {
                ordered_ids.push(playlist.id.clone());
                new_items += 1;
            }
            by_id.insert(playlist.id.clone(), playlist);
        }

        self.continuation_token = page.continuation_token;
        self.can_load_more = self.can_load_more && !page.is_last_page;
        new_items
    }

    fn snapshot(&self) -> PlaylistSnapshot {
        PlaylistSnapshot::new(
            Arc::clone(&self.ordered_ids),
            Arc::clone(&self.by_id),
            self.can_load_more,
        )
    }

    fn fetch_mode(&self) -> FetchMode {
        if self.continuation_token.is_none() && self.ordered_ids.is_empty() {
            FetchMode::FirstPage
        } else {
            FetchMode::NextPage(self.continuation_token.clone())
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<CacheState>,
    snapshots: watch::Sender<PlaylistSnapshot>,
}

impl Shared {
    /// Publishes the current state; called with the state lock held so
    /// observers see snapshots in mutation order.
    fn publish(&self, state: &CacheState) {
        self.snapshots.send_replace(state.snapshot());
    }
}

/// Merged, deduplicated view of one service's paginated playlists.
#[derive(Debug, Clone)]
pub struct RemotePlaylistCache {
    service: Service,
    shared: Arc<Shared>,
}

impl RemotePlaylistCache {
    /// Creates an empty cache for `service`.
    pub fn new(service: Service) -> Self {
        let state = CacheState::new();
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            service,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    /// The service this cache belongs to.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Clears all state so pagination restarts from the first page.
    pub fn reset(&self) {
        let mut state = self.shared.state.lock();
        state.reset();
        self.shared.publish(&state);
        debug!(service = %self.service, epoch = state.epoch, "Playlist cache reset");
    }

    /// Sets the in-flight flag directly.
    ///
    /// Loads should go through [`try_begin_load`](Self::try_begin_load),
    /// whose ticket releases the flag on every exit path.
    pub fn set_loading(&self, loading: bool) {
        self.shared.state.lock().is_loading = loading;
    }

    /// Merges a page and returns how many identities were appended.
    pub fn merge(&self, page: PlaylistPage) -> usize {
        let mut state = self.shared.state.lock();
        let new_items = state.merge(page);
        self.shared.publish(&state);
        new_items
    }

    /// Returns a value copy of the current state.
    pub fn snapshot(&self) -> PlaylistSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Receives a new snapshot after every merge and reset.
    pub fn subscribe(&self) -> watch::Receiver<PlaylistSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.shared.state.lock().is_loading
    }

    /// Whether the provider may have more pages.
    pub fn can_load_more(&self) -> bool {
        self.shared.state.lock().can_load_more
    }

    /// Token for the next fetch.
    pub fn continuation_token(&self) -> Option<String> {
        self.shared.state.lock().continuation_token.clone()
    }

    /// Number of merged identities.
    pub fn len(&self) -> usize {
        self.shared.state.lock().ordered_ids.len()
    }

    /// True when nothing has been merged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Admits a load if none is in flight and more pages may exist.
    pub fn try_begin_load(&self) -> LoadAdmission {
        let mut state = self.shared.state.lock();
        if state.is_loading {
            return LoadAdmission::Skipped(SkipReason::InFlight);
        }
        if !state.can_load_more {
            return LoadAdmission::Skipped(SkipReason::Exhausted);
        }

        state.is_loading = true;
        LoadAdmission::Admitted(LoadTicket {
            shared: Arc::clone(&self.shared),
            epoch: state.epoch,
            mode: state.fetch_mode(),
        })
    }

    /// Merges a page fetched under `ticket`, unless the cache was reset since.
    pub fn merge_ticket(&self, ticket: &LoadTicket, page: PlaylistPage) -> MergeOutcome {
        let mut state = self.shared.state.lock();
        if state.epoch != ticket.epoch {
            debug!(
                service = %self.service,
                ticket_epoch = ticket.epoch,
                epoch = state.epoch,
                "Discarding page fetched before reset"
            );
            return MergeOutcome::Superseded;
        }

        let page_len = page.len();
        let new_items = state.merge(page);
        self.shared.publish(&state);

        info!(
            service = %self.service,
            page_len,
            new_items,
            total = state.ordered_ids.len(),
            can_load_more = state.can_load_more,
            "Merged playlist page"
        );

        MergeOutcome::Applied {
            new_items,
            can_load_more: state.can_load_more,
        }
    }
}

/// Proof of an admitted load.
///
/// Holds the loading flag for as long as it lives; dropping it releases the
/// flag, including when the owning future is cancelled.
#[derive(Debug)]
pub struct LoadTicket {
    shared: Arc<Shared>,
    epoch: u64,
    mode: FetchMode,
}

impl LoadTicket {
    /// Which provider operation to call.
    pub fn mode(&self) -> &FetchMode {
        &self.mode
    }

    /// Epoch the ticket was issued in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl Drop for LoadTicket {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        if state.epoch == self.epoch {
            state.is_loading = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playlist(raw: &str, name: &str) -> Playlist {
        Playlist::new(PlaylistId::new(Service::AppleMusic, raw), name)
    }

    fn id(raw: &str) -> PlaylistId {
        PlaylistId::new(Service::AppleMusic, raw)
    }

    fn page(raws: &[&str], token: Option<&str>, last: bool) -> PlaylistPage {
        PlaylistPage::new(
            raws.iter().map(|r| playlist(r, r)).collect(),
            token.map(str::to_string),
            last,
        )
    }

    fn admitted(cache: &RemotePlaylistCache) -> LoadTicket {
        match cache.try_begin_load() {
            LoadAdmission::Admitted(ticket) => ticket,
            LoadAdmission::Skipped(reason) => panic!("expected admission, got {:?}", reason),
        }
    }

    #[test]
    fn test_new_cache_is_empty_and_loadable() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let snapshot = cache.snapshot();
        assert!(snapshot.is_empty());
        assert!(snapshot.can_load_more());
        assert!(!cache.is_loading());
        assert!(cache.continuation_token().is_none());
    }

    #[test]
    fn test_merge_two_pages_dedups_and_ends() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);

        cache.merge(page(&["A", "B"], Some("t1"), false));
        cache.merge(page(&["B", "C"], Some("t2"), true));

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.ordered_ids(), &[id("A"), id("B"), id("C")]);
        assert_eq!(cache.continuation_token().as_deref(), Some("t2"));
        assert!(!snapshot.can_load_more());
    }

    #[test]
    fn test_merge_returns_new_item_count() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        assert_eq!(cache.merge(page(&["A", "B"], None, false)), 2);
        assert_eq!(cache.merge(page(&["B", "C", "C"], None, false)), 1);
    }

    #[test]
    fn test_repeated_item_updates_in_place() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(PlaylistPage::new(
            vec![playlist("A", "Old"), playlist("B", "B")],
            Some("t1".into()),
            false,
        ));
        cache.merge(PlaylistPage::new(
            vec![playlist("A", "New").with_artwork("https://x/a.png")],
            Some("t2".into()),
            false,
        ));

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.ordered_ids(), &[id("A"), id("B")]);
        let a = snapshot.get(&id("A")).unwrap();
        assert_eq!(a.name, "New");
        assert_eq!(a.artwork.as_deref(), Some("https://x/a.png"));
    }

    #[test]
    fn test_end_of_data_is_sticky() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(page(&["A"], None, true));
        cache.merge(page(&["B"], Some("t"), false));
        assert!(!cache.can_load_more());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(page(&["A", "B"], Some("t1"), false));
        cache.merge(page(&["B", "C"], Some("t2"), true));
        cache.set_loading(true);

        cache.reset();

        let snapshot = cache.snapshot();
        assert!(snapshot.ordered_ids().is_empty());
        assert!(snapshot.by_id().is_empty());
        assert!(snapshot.can_load_more());
        assert!(cache.continuation_token().is_none());
        assert!(!cache.is_loading());
    }

    #[test]
    fn test_reset_forgets_seen_identities() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(page(&["A"], None, false));
        cache.reset();
        assert_eq!(cache.merge(page(&["A"], None, false)), 1);
    }

    #[test]
    fn test_snapshot_is_not_live() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(page(&["A"], None, false));
        let before = cache.snapshot();

        cache.merge(page(&["B"], None, true));

        assert_eq!(before.ordered_ids(), &[id("A")]);
        assert!(before.can_load_more());
        assert_eq!(cache.snapshot().len(), 2);
    }

    #[test]
    fn test_first_load_uses_first_page_mode() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let ticket = admitted(&cache);
        assert_eq!(ticket.mode(), &FetchMode::FirstPage);
    }

    #[test]
    fn test_later_load_uses_stored_token() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(page(&["A"], Some("25"), false));
        let ticket = admitted(&cache);
        assert_eq!(ticket.mode(), &FetchMode::NextPage(Some("25".to_string())));
    }

    #[test]
    fn test_tokenless_nonempty_cache_continues() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(page(&["A"], None, false));
        let ticket = admitted(&cache);
        assert_eq!(ticket.mode(), &FetchMode::NextPage(None));
    }

    #[test]
    fn test_second_admission_is_skipped_while_in_flight() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let _ticket = admitted(&cache);
        assert!(matches!(
            cache.try_begin_load(),
            LoadAdmission::Skipped(SkipReason::InFlight)
        ));
    }

    #[test]
    fn test_admission_skipped_when_exhausted() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        cache.merge(page(&[], None, true));
        assert!(matches!(
            cache.try_begin_load(),
            LoadAdmission::Skipped(SkipReason::Exhausted)
        ));
        assert!(!cache.is_loading());
    }

    #[test]
    fn test_dropping_ticket_releases_loading_flag() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let ticket = admitted(&cache);
        assert!(cache.is_loading());
        drop(ticket);
        assert!(!cache.is_loading());
    }

    #[test]
    fn test_merge_ticket_after_reset_is_superseded() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let ticket = admitted(&cache);

        cache.reset();
        let outcome = cache.merge_ticket(&ticket, page(&["A"], Some("t"), false));

        assert_eq!(outcome, MergeOutcome::Superseded);
        assert!(cache.is_empty());
        assert!(cache.continuation_token().is_none());
    }

    #[test]
    fn test_stale_ticket_does_not_release_newer_load() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let stale = admitted(&cache);
        cache.reset();
        let _fresh = admitted(&cache);

        drop(stale);

        assert!(cache.is_loading());
    }

    #[test]
    fn test_merge_ticket_applies_page() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let ticket = admitted(&cache);
        let outcome = cache.merge_ticket(&ticket, page(&["A", "B"], Some("2"), false));
        assert_eq!(
            outcome,
            MergeOutcome::Applied {
                new_items: 2,
                can_load_more: true
            }
        );
        drop(ticket);
        assert!(!cache.is_loading());
    }

    #[tokio::test]
    async fn test_subscribers_see_merges_and_resets() {
        let cache = RemotePlaylistCache::new(Service::AppleMusic);
        let mut rx = cache.subscribe();

        cache.merge(page(&["A"], None, false));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        cache.reset();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    fn arb_pages() -> impl Strategy<Value = Vec<(Vec<u8>, bool)>> {
        prop::collection::vec(
            (prop::collection::vec(0u8..20, 0..8), any::<bool>()),
            0..10,
        )
    }

    proptest! {
        #[test]
        fn prop_ordered_ids_never_contain_duplicates(pages in arb_pages()) {
            let cache = RemotePlaylistCache::new(Service::AppleMusic);
            for (ids, last) in pages {
                let raws: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
                let refs: Vec<&str> = raws.iter().map(String::as_str).collect();
                cache.merge(page(&refs, None, last));
            }
            let snapshot = cache.snapshot();
            let unique: HashSet<_> = snapshot.ordered_ids().iter().collect();
            prop_assert_eq!(unique.len(), snapshot.len());
            prop_assert_eq!(snapshot.by_id().len(), snapshot.len());
            for id in snapshot.ordered_ids() {
                prop_assert!(snapshot.by_id().contains_key(id));
            }
        }

        #[test]
        fn prop_positions_are_stable(pages in arb_pages()) {
            let cache = RemotePlaylistCache::new(Service::AppleMusic);
            let mut previous: Vec<PlaylistId> = Vec::new();
            let mut ended = false;
            for (ids, last) in pages {
                let raws: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
                let refs: Vec<&str> = raws.iter().map(String::as_str).collect();
                cache.merge(page(&refs, None, last));
                ended |= last;

                let current = cache.snapshot();
                prop_assert!(current.ordered_ids().starts_with(&previous));
                prop_assert_eq!(current.can_load_more(), !ended);
                previous = current.ordered_ids().to_vec();
            }
        }
    }
}
