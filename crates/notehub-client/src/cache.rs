//! Query cache for list pages.
//!
//! Caches the last successful [`NotesPage`] per [`QueryKey`] and
//! coordinates fetches so the remote API sees as few round trips as
//! possible.
//!
//! ## Policy
//!
//! - One slot per key; distinct keys never share a slot.
//! - At most one request in flight per key. Concurrent lookups for that
//!   key await the same shared outcome instead of issuing a second request.
//! - A cached page is `Fresh` for `stale_time` after it was fetched, then
//!   `Stale`. Stale pages are still served, with a refresh started in the
//!   background (stale-while-revalidate).
//! - [`QueryCache::invalidate_all`] marks every page of the namespace stale
//!   at once (coarse invalidation). Pages are never patched in place.
//! - Errors are not cached. The next lookup after a failure starts over.
//! - Entries not touched for `gc_time` are dropped by
//!   [`QueryCache::evict_expired`].
//!
//! Staleness is tracked with an epoch counter: each invalidation bumps the
//! epoch, and a page fetched under an older epoch is stale no matter its
//! age. A response that arrives after a newer one was stored for the same
//! key is discarded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use notehub_core::{DEFAULT_PER_PAGE, NotesPage, QueryKey};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api::NotesApi;
use crate::error::ApiResult;

/// Default time a page counts as fresh. Zero means every hit revalidates.
pub const DEFAULT_STALE_TIME: Duration = Duration::ZERO;

/// Default time an untouched entry is kept before eviction (5 minutes).
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(300);

/// Configuration for cache behavior.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// How long a fetched page is served without a background refresh.
    pub stale_time: Duration,

    /// How long an entry survives without being looked up.
    pub gc_time: Duration,

    /// Page size sent with every list request.
    pub per_page: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl CacheConfig {
    /// Sets the fresh period.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Sets the eviction period.
    pub fn with_gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    /// Sets the page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }
}

/// Freshness of a cached page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Within `stale_time` and not invalidated.
    Fresh,
    /// Servable, but a refresh should be started.
    Stale,
}

/// A cached page with its freshness.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub page: NotesPage,
    pub status: CacheStatus,
    pub fetched_at: Instant,
}

impl CachedPage {
    pub fn is_fresh(&self) -> bool {
        self.status == CacheStatus::Fresh
    }
}

/// Statistics about cache state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of slots, with or without data.
    pub total: usize,
    /// Slots holding a fresh page.
    pub fresh: usize,
    /// Slots holding a stale page.
    pub stale: usize,
    /// Slots with a request in flight.
    pub fetching: usize,
}

type SharedFetch = Shared<BoxFuture<'static, ApiResult<NotesPage>>>;

struct InFlight {
    id: u64,
    epoch: u64,
    fetch: SharedFetch,
}

struct StoredPage {
    page: NotesPage,
    fetched_at: Instant,
    epoch: u64,
}

struct CacheEntry {
    data: Option<StoredPage>,
    in_flight: Option<InFlight>,
    last_access: Instant,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            data: None,
            in_flight: None,
            last_access: Instant::now(),
        }
    }
}

struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    epoch: u64,
    next_fetch_id: u64,
}

impl CacheState {
    fn status_of(&self, stored: &StoredPage, config: &CacheConfig) -> CacheStatus {
        if stored.epoch == self.epoch && stored.fetched_at.elapsed() < config.stale_time {
            CacheStatus::Fresh
        } else {
            CacheStatus::Stale
        }
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared, cloneable query cache over a [`NotesApi`].
///
/// Clones share the same slots; the lock is never held across an await.
pub struct QueryCache<A> {
    api: Arc<A>,
    config: CacheConfig,
    state: Arc<Mutex<CacheState>>,
}

impl<A> Clone for QueryCache<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: self.config,
            state: Arc::clone(&self.state),
        }
    }
}

impl<A> std::fmt::Debug for QueryCache<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<A: NotesApi> QueryCache<A> {
    /// Creates a cache with default configuration.
    pub fn new(api: Arc<A>) -> Self {
        Self::with_config(api, CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(api: Arc<A>, config: CacheConfig) -> Self {
        Self {
            api,
            config,
            state: Arc::new(Mutex::new(CacheState {
                entries: HashMap::new(),
                epoch: 0,
                next_fetch_id: 0,
            })),
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The API the cache fetches from.
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Returns the cached page for a key without fetching.
    pub fn peek(&self, key: &QueryKey) -> Option<CachedPage> {
        let state = lock(&self.state);
        let stored = state.entries.get(key)?.data.as_ref()?;
        Some(CachedPage {
            page: stored.page.clone(),
            status: state.status_of(stored, &self.config),
            fetched_at: stored.fetched_at,
        })
    }

    /// Returns true if a request for this key is in flight.
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        lock(&self.state)
            .entries
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// Returns the page for a key, fetching only when needed.
    ///
    /// - fresh hit: returned as-is
    /// - stale hit: returned as-is, refresh spawned in the background
    /// - miss: fetched (joining any request already in flight)
    pub async fn get(&self, key: &QueryKey) -> ApiResult<NotesPage> {
        self.evict_expired();

        match self.peek(key) {
            Some(cached) if cached.is_fresh() => {
                debug!(%key, "cache hit");
                self.touch(key);
                Ok(cached.page)
            }
            Some(cached) => {
                debug!(%key, "stale hit, revalidating");
                self.revalidate(key);
                Ok(cached.page)
            }
            None => {
                debug!(%key, "cache miss");
                self.fetch(key).await
            }
        }
    }

    /// Fetches a key from the API, joining a request already in flight.
    ///
    /// A request started before the last invalidation is not joined; a new
    /// one is issued so the caller sees post-invalidation data.
    pub async fn fetch(&self, key: &QueryKey) -> ApiResult<NotesPage> {
        self.start_fetch(key).await
    }

    /// Starts a background refresh of a key unless one is already running.
    pub fn revalidate(&self, key: &QueryKey) {
        let fetch = self.start_fetch(key);
        tokio::spawn(async move {
            let _ = fetch.await;
        });
    }

    /// Marks every cached page stale.
    ///
    /// Pages stay servable; the next lookup of each key refetches it.
    /// Returns the number of pages affected.
    pub fn invalidate_all(&self) -> usize {
        let mut state = lock(&self.state);
        state.epoch += 1;
        let affected = state
            .entries
            .values()
            .filter(|entry| entry.data.is_some())
            .count();
        info!(
            namespace = QueryKey::NAMESPACE,
            affected, "invalidated cached pages"
        );
        affected
    }

    /// Removes entries not looked up within `gc_time`.
    ///
    /// Entries with a request in flight are kept. Returns the number of
    /// entries removed.
    pub fn evict_expired(&self) -> usize {
        let gc_time = self.config.gc_time;
        let mut state = lock(&self.state);
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| entry.in_flight.is_some() || entry.last_access.elapsed() <= gc_time);
        let removed = before - state.entries.len();
        if removed > 0 {
            debug!(removed, "evicted unused cache entries");
        }
        removed
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    /// Returns true if the cache has no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns statistics about the cache.
    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        let mut stats = CacheStats {
            total: state.entries.len(),
            ..CacheStats::default()
        };

        for entry in state.entries.values() {
            if entry.in_flight.is_some() {
                stats.fetching += 1;
            }
            match entry.data.as_ref().map(|d| state.status_of(d, &self.config)) {
                Some(CacheStatus::Fresh) => stats.fresh += 1,
                Some(CacheStatus::Stale) => stats.stale += 1,
                None => {}
            }
        }

        stats
    }

    fn touch(&self, key: &QueryKey) {
        if let Some(entry) = lock(&self.state).entries.get_mut(key) {
            entry.last_access = Instant::now();
        }
    }

    /// Returns the shared request for a key, issuing one if needed.
    fn start_fetch(&self, key: &QueryKey) -> SharedFetch {
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        let epoch = state.epoch;

        let entry = state
            .entries
            .entry(key.clone())
            .or_insert_with(CacheEntry::new);
        entry.last_access = Instant::now();

        if let Some(in_flight) = entry.in_flight.as_ref().filter(|f| f.epoch == epoch) {
            debug!(%key, "joining in-flight request");
            return in_flight.fetch.clone();
        }

        state.next_fetch_id += 1;
        let id = state.next_fetch_id;

        let api = Arc::clone(&self.api);
        let slots = Arc::clone(&self.state);
        let per_page = self.config.per_page;
        let fetch_key = key.clone();

        let fetch = async move {
            let result = api
                .list_notes(fetch_key.search(), fetch_key.page(), per_page)
                .await;
            complete_fetch(&slots, &fetch_key, id, epoch, &result);
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            id,
            epoch,
            fetch: fetch.clone(),
        });
        debug!(%key, id, epoch, "issued request");

        fetch
    }
}

/// Records the outcome of request `id` for `key`, issued under `epoch`.
fn complete_fetch(
    slots: &Mutex<CacheState>,
    key: &QueryKey,
    id: u64,
    epoch: u64,
    result: &ApiResult<NotesPage>,
) {
    let mut state = lock(slots);
    let Some(entry) = state.entries.get_mut(key) else {
        debug!(%key, "slot cleared before response arrived");
        return;
    };

    if entry.in_flight.as_ref().is_some_and(|f| f.id == id) {
        entry.in_flight = None;
    }

    match result {
        Ok(page) => {
            if entry.data.as_ref().is_some_and(|d| d.epoch > epoch) {
                warn!(%key, id, "discarding response older than cached page");
                return;
            }
            entry.data = Some(StoredPage {
                page: page.clone(),
                fetched_at: Instant::now(),
                epoch,
            });
        }
        Err(err) => {
            warn!(%key, id, error = %err, "list request failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeNotesApi;

    fn fresh_for_a_minute() -> CacheConfig {
        CacheConfig::default().with_stale_time(Duration::from_secs(60))
    }

    #[test]
    fn cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.stale_time, DEFAULT_STALE_TIME);
        assert_eq!(config.gc_time, DEFAULT_GC_TIME);
        assert_eq!(config.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn per_page_is_at_least_one() {
        assert_eq!(CacheConfig::default().with_per_page(0).per_page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn miss_then_fresh_hit() {
        let api = Arc::new(FakeNotesApi::with_notes(30));
        let cache = QueryCache::with_config(Arc::clone(&api), fresh_for_a_minute());
        let key = QueryKey::initial();

        assert!(cache.peek(&key).is_none());

        let page = cache.get(&key).await.unwrap();
        assert_eq!(page.notes.len(), 12);
        assert_eq!(page.total_pages, 3);

        let again = cache.get(&key).await.unwrap();
        assert_eq!(again, page);
        assert_eq!(api.list_calls().len(), 1);
        assert!(cache.peek(&key).unwrap().is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_keys_use_distinct_slots() {
        let api = Arc::new(FakeNotesApi::with_notes(30));
        let cache = QueryCache::with_config(Arc::clone(&api), fresh_for_a_minute());

        let first = cache.get(&QueryKey::new("", 1)).await.unwrap();
        let second = cache.get(&QueryKey::new("", 2)).await.unwrap();

        assert_ne!(first.notes[0].id, second.notes[0].id);
        assert_eq!(cache.len(), 2);
        assert_eq!(
            api.list_calls(),
            vec![QueryKey::new("", 1), QueryKey::new("", 2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_lookups_share_one_request() {
        let api = Arc::new(FakeNotesApi::with_notes(5));
        api.set_delay("", Duration::from_millis(200));
        let cache = QueryCache::new(Arc::clone(&api));
        let key = QueryKey::initial();

        let (a, b, c) = tokio::join!(cache.get(&key), cache.fetch(&key), cache.get(&key));

        assert_eq!(a.unwrap().notes.len(), 5);
        assert_eq!(b.unwrap().notes.len(), 5);
        assert_eq!(c.unwrap().notes.len(), 5);
        assert_eq!(api.list_calls().len(), 1);
        assert!(!cache.is_fetching(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn errors_are_not_cached() {
        let api = Arc::new(FakeNotesApi::with_notes(3));
        api.fail_next_lists(1);
        let cache = QueryCache::with_config(Arc::clone(&api), fresh_for_a_minute());
        let key = QueryKey::initial();

        assert!(cache.get(&key).await.is_err());
        assert!(cache.peek(&key).is_none());
        assert!(!cache.is_fetching(&key));

        let page = cache.get(&key).await.unwrap();
        assert_eq!(page.notes.len(), 3);
        assert_eq!(api.list_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_page_turns_stale_after_stale_time() {
        let api = Arc::new(FakeNotesApi::with_notes(3));
        let cache = QueryCache::with_config(Arc::clone(&api), fresh_for_a_minute());
        let key = QueryKey::initial();

        cache.get(&key).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(cache.peek(&key).unwrap().status, CacheStatus::Stale);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_hit_serves_cached_page_and_refreshes() {
        let api = Arc::new(FakeNotesApi::with_notes(3));
        let cache = QueryCache::new(Arc::clone(&api));
        let key = QueryKey::initial();

        cache.get(&key).await.unwrap();
        api.add_note("Fresh arrival", "");

        // Zero stale time: served from cache, refreshed in the background.
        let served = cache.get(&key).await.unwrap();
        assert_eq!(served.notes.len(), 3);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(api.list_calls().len(), 2);
        assert_eq!(cache.peek(&key).unwrap().page.notes.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_all_marks_every_page_stale() {
        let api = Arc::new(FakeNotesApi::with_notes(30));
        let cache = QueryCache::with_config(Arc::clone(&api), fresh_for_a_minute());

        cache.get(&QueryKey::new("", 1)).await.unwrap();
        cache.get(&QueryKey::new("", 2)).await.unwrap();
        cache.get(&QueryKey::new("Note 1", 1)).await.unwrap();

        assert_eq!(cache.invalidate_all(), 3);

        let stats = cache.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.fresh, 0);
        assert_eq!(stats.stale, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_after_invalidation_reflects_new_note() {
        let api = Arc::new(FakeNotesApi::with_notes(2));
        let cache = QueryCache::with_config(Arc::clone(&api), fresh_for_a_minute());
        let key = QueryKey::initial();

        cache.get(&key).await.unwrap();
        api.add_note("Created later", "");
        cache.invalidate_all();

        let page = cache.fetch(&key).await.unwrap();
        assert_eq!(page.notes.len(), 3);
        assert!(cache.peek(&key).unwrap().is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn request_from_before_invalidation_is_not_joined() {
        let api = Arc::new(FakeNotesApi::with_notes(2));
        api.set_delay("", Duration::from_millis(500));
        let cache = QueryCache::new(Arc::clone(&api));
        let key = QueryKey::initial();

        let early = cache.clone();
        let early_key = key.clone();
        let early_fetch = tokio::spawn(async move { early.fetch(&early_key).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        api.add_note("Created mid-flight", "");
        cache.invalidate_all();
        api.set_delay("", Duration::from_millis(100));

        let late = cache.fetch(&key).await.unwrap();
        let late_stored_at = Instant::now();
        assert_eq!(late.notes.len(), 3);
        assert_eq!(api.list_calls().len(), 2);

        // The first request finishes last and must not overwrite newer data.
        early_fetch.await.unwrap().unwrap();
        let cached = cache.peek(&key).unwrap();
        assert!(cached.fetched_at <= late_stored_at);
        assert_eq!(cached.page.notes.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unused_entries_are_evicted_after_gc_time() {
        let api = Arc::new(FakeNotesApi::with_notes(3));
        let config = CacheConfig::default().with_gc_time(Duration::from_secs(10));
        let cache = QueryCache::with_config(Arc::clone(&api), config);

        cache.get(&QueryKey::new("", 1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.get(&QueryKey::new("Note", 1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.peek(&QueryKey::new("", 1)).is_none());
        assert!(cache.peek(&QueryKey::new("Note", 1)).is_some());
    }
}
