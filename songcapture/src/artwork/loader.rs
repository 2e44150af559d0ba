//! Coalescing artwork loader.
//!
//! Resolves artwork locators to decoded images. Concurrent requests for the
//! same locator share one fetch; results are kept in a byte-bounded LRU.
//!
//! # Lifecycle of a key
//!
//! ```text
//! resolve(key)
//!   ├─ cached?      ──► return it
//!   ├─ in flight?   ──► await the shared handle
//!   └─ otherwise    ──► spawn fetch task, register handle, await it
//!                          │
//!                          ├─ parse locator, pick source by scheme
//!                          ├─ fetch bytes
//!                          ├─ decode on blocking pool
//!                          ├─ on success: insert into cache
//!                          └─ remove in-flight marker (always)
//! ```
//!
//! The fetch runs in its own task, so dropping or cancelling any one caller
//! never aborts the fetch for the others.
//!
//! The task inserts into the cache before it removes its marker, and a new
//! fetch is only registered after re-checking the cache under the in-flight
//! entry lock. Together these mean a key is never fetched twice just because
//! a caller raced with a completing fetch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::artwork::source::{parse_locator, SourceKind};
use crate::artwork::{
    Artwork, ArtworkDecoder, ArtworkSource, HttpArtworkSource, ImageDecoder, LocalAssetSource,
    ResolveError,
};
use crate::cache::{CacheStats, MemoryCache};
use crate::provider::AsyncHttpClient;

/// Default artwork memory budget: 64 MB of decoded pixels.
pub const DEFAULT_ARTWORK_MEMORY_SIZE: u64 = 64 * 1024 * 1024;

type ResolveResult = Result<Arc<Artwork>, ResolveError>;
type SharedResolve = Shared<BoxFuture<'static, ResolveResult>>;

/// Artwork loader tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkConfig {
    /// Byte budget for decoded images.
    pub memory_size: u64,
    /// Root directory for `musickit://` locators.
    pub asset_root: PathBuf,
    /// Downsample so neither edge exceeds this.
    pub max_edge: Option<u32>,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_ARTWORK_MEMORY_SIZE,
            asset_root: PathBuf::from("."),
            max_edge: None,
        }
    }
}

impl ArtworkConfig {
    pub fn with_memory_size(mut self, bytes: u64) -> Self {
        self.memory_size = bytes;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_max_edge(mut self, max_edge: Option<u32>) -> Self {
        self.max_edge = max_edge;
        self
    }
}

struct LoaderInner {
    cache: MemoryCache<Arc<Artwork>>,
    in_flight: DashMap<String, SharedResolve>,
    remote: Arc<dyn ArtworkSource>,
    local: Arc<dyn ArtworkSource>,
    decoder: Arc<dyn ArtworkDecoder>,
    fetches_started: AtomicU64,
}

impl LoaderInner {
    async fn fetch_and_decode(&self, key: &str) -> ResolveResult {
        let locator = parse_locator(key)?;
        let source = match SourceKind::for_url(&locator)? {
            SourceKind::Remote => &self.remote,
            SourceKind::Local => &self.local,
        };
        let bytes = source.fetch_bytes(&locator).await?;
        trace!(key, bytes = bytes.len(), "Artwork bytes fetched");

        let decoder = Arc::clone(&self.decoder);
        let artwork = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| ResolveError::TaskFailed(e.to_string()))??;
        Ok(Arc::new(artwork))
    }
}

/// Removes a key's in-flight marker when dropped, including on panic.
struct InFlightGuard {
    inner: Arc<LoaderInner>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner.in_flight.remove(&self.key);
    }
}

/// Request-coalescing, memory-bounded artwork cache.
///
/// Cheap to clone; clones share the cache and in-flight table.
#[derive(Clone)]
pub struct ArtworkLoader {
    inner: Arc<LoaderInner>,
}

impl ArtworkLoader {
    /// Creates a loader from explicit sources and decoder.
    pub fn new(
        config: &ArtworkConfig,
        remote: Arc<dyn ArtworkSource>,
        local: Arc<dyn ArtworkSource>,
        decoder: Arc<dyn ArtworkDecoder>,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                cache: MemoryCache::new(config.memory_size),
                in_flight: DashMap::new(),
                remote,
                local,
                decoder,
                fetches_started: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a loader that fetches remote artwork through `client`.
    pub fn with_http_client<C>(client: C, config: &ArtworkConfig) -> Self
    where
        C: AsyncHttpClient + 'static,
    {
        Self::new(
            config,
            Arc::new(HttpArtworkSource::new(client)),
            Arc::new(LocalAssetSource::new(config.asset_root.clone())),
            Arc::new(ImageDecoder::new().with_max_edge(config.max_edge)),
        )
    }

    /// Resolves `key` to a decoded image.
    ///
    /// Returns the cached image if present, joins a fetch already in flight
    /// for the same key, or starts one. Failures are not cached.
    pub async fn resolve(&self, key: &str) -> ResolveResult {
        loop {
            if let Some(artwork) = self.inner.cache.get(key).await {
                trace!(key, "Artwork cache hit");
                return Ok(artwork);
            }

            let pending = match self.inner.in_flight.entry(key.to_string()) {
                Entry::Occupied(entry) => {
                    debug!(key, "Joining in-flight artwork fetch");
                    entry.get().clone()
                }
                Entry::Vacant(entry) => {
                    // A fetch finished between the cache check and here.
                    if self.inner.cache.contains(key) {
                        continue;
                    }
                    let pending = self.start_fetch(key.to_string());
                    entry.insert(pending.clone());
                    pending
                }
            };

            return pending.await;
        }
    }

    /// Like [`resolve`](Self::resolve), but gives up when `cancel` fires.
    ///
    /// Cancelling only affects this caller; the fetch keeps running for
    /// anyone else waiting on it and still populates the cache.
    pub async fn resolve_with_cancel(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> ResolveResult {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(key, "Artwork resolve cancelled");
                Err(ResolveError::Cancelled)
            }
            result = self.resolve(key) => result,
        }
    }

    /// Spawns the fetch task; must be called with the key's entry locked.
    fn start_fetch(&self, key: String) -> SharedResolve {
        self.inner.fetches_started.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Starting artwork fetch");

        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            key,
        };
        let handle = tokio::spawn(async move {
            let inner = Arc::clone(&guard.inner);
            let result = inner.fetch_and_decode(&guard.key).await;
            match &result {
                Ok(artwork) => {
                    inner
                        .cache
                        .put(guard.key.clone(), Arc::clone(artwork))
                        .await;
                }
                Err(e) => warn!(key = %guard.key, error = %e, "Artwork resolve failed"),
            }
            drop(guard);
            result
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(ResolveError::TaskFailed(e.to_string())),
            }
        }
        .boxed()
        .shared()
    }

    /// Whether `key` is cached.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.cache.contains(key)
    }

    /// Number of cached images; may lag slightly behind inserts.
    pub fn cached_count(&self) -> u64 {
        self.inner.cache.entry_count()
    }

    /// Number of fetches currently running.
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Total fetches started since creation.
    pub fn fetches_started(&self) -> u64 {
        self.inner.fetches_started.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Drops every cached image. Fetches in flight are unaffected.
    pub async fn invalidate_all(&self) {
        self.inner.cache.clear().await;
    }
}
