//! Display-driven page prefetching.
//!
//! The list view reports each row as it becomes visible. Once a row within
//! `threshold` of the end of the loaded list is shown, the next page is
//! requested so the user rarely scrolls onto a blank tail.
//!
//! - [`should_load_more`]: the pure trigger rule
//! - [`PrefetchTrigger`]: applies the rule for one service and spawns loads

mod config;
mod trigger;

pub use config::{PrefetchConfig, DEFAULT_PREFETCH_THRESHOLD};
pub use trigger::PrefetchTrigger;

/// Whether displaying row `index` of `count` loaded rows should request more.
///
/// True when the row is within `threshold` of the end, more pages may exist,
/// and no load is in flight. A threshold at or above `count` triggers on
/// every row.
pub fn should_load_more(
    index: usize,
    count: usize,
    threshold: usize,
    can_load_more: bool,
    is_loading: bool,
) -> bool {
    can_load_more && !is_loading && index >= count.saturating_sub(threshold)
}
