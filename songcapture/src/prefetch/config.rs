//! Prefetch tuning.

/// Default number of rows from the end at which the next page is requested.
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 10;

/// Configuration for display-driven prefetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchConfig {
    /// Rows before the end of the list that trigger a load.
    ///
    /// With 25 rows and a threshold of 10, displaying row 15 triggers.
    pub threshold: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PREFETCH_THRESHOLD,
        }
    }
}

impl PrefetchConfig {
    pub fn with_threshold(threshold: usize) -> Self {
        Self { threshold }
    }
}
