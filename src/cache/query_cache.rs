use super::snapshot::{CacheStats, QuerySnapshot};
use super::subscription::Subscription;
use crate::client::{ClientConfig, RestaurantsApi};
use crate::core::{ClientError, Page, PageKey, RestaurantsPublic, Result};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Listener invoked with a fresh snapshot whenever cache state changes.
pub type SnapshotCallback = Arc<dyn Fn(&QuerySnapshot) + Send + Sync>;

/// How many times a fetch overtaken by `invalidate()` is re-issued before
/// its result is handed back uncached.
const MAX_REVALIDATION_ROUNDS: usize = 3;

#[derive(Debug, Clone)]
struct CacheEntry {
    page: Arc<Page>,
    generation: u64,
}

struct CacheState {
    entries: LruCache<PageKey, CacheEntry>,
    /// Bumped by every invalidation. Entries from older generations are stale.
    generation: u64,
    /// Most recently requested key; the only key allowed to change `displayed`
    requested: Option<PageKey>,
    displayed: Option<CacheEntry>,
    in_flight: HashMap<PageKey, usize>,
    errors: HashMap<PageKey, ClientError>,
    listeners: HashMap<PageKey, Vec<(u64, SnapshotCallback)>>,
    next_listener_id: u64,
    stats: CacheStats,
}

type Notification = (SnapshotCallback, QuerySnapshot);

enum FetchStart {
    Hit(Arc<Page>),
    Network { generation: u64 },
}

enum FetchEnd {
    Applied(Result<Arc<Page>>),
    /// An invalidation landed while the request was in flight
    Overtaken(Arc<Page>),
}

impl CacheState {
    fn fresh(&mut self, key: PageKey) -> Option<CacheEntry> {
        let generation = self.generation;
        self.entries
            .get(&key)
            .filter(|entry| entry.generation == generation)
            .cloned()
    }

    fn snapshot(&self, key: PageKey) -> QuerySnapshot {
        let is_fetching = self.in_flight.get(&key).copied().unwrap_or(0) > 0;

        let (page, is_placeholder) = match self.entries.peek(&key) {
            Some(entry) => (Some(entry.page.clone()), entry.generation != self.generation),
            None => match &self.displayed {
                Some(entry) => (
                    Some(entry.page.clone()),
                    entry.page.key() != key || entry.generation != self.generation,
                ),
                None => (None, false),
            },
        };

        QuerySnapshot {
            key,
            is_loading: page.is_none() && is_fetching,
            page,
            is_fetching,
            is_placeholder,
            error: self.errors.get(&key).cloned(),
        }
    }

    fn notifications(&self) -> Vec<Notification> {
        self.listeners
            .iter()
            .flat_map(|(key, listeners)| {
                let snapshot = self.snapshot(*key);
                listeners
                    .iter()
                    .map(move |(_, callback)| (callback.clone(), snapshot.clone()))
            })
            .collect()
    }

    fn finish_flight(&mut self, key: PageKey) {
        if let Some(count) = self.in_flight.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.in_flight.remove(&key);
            }
        }
    }
}

pub(crate) struct Shared {
    state: Mutex<CacheState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn unsubscribe(&self, key: PageKey, listener_id: u64) {
        let mut state = self.lock();
        if let Some(listeners) = state.listeners.get_mut(&key) {
            listeners.retain(|(id, _)| *id != listener_id);
            if listeners.is_empty() {
                state.listeners.remove(&key);
            }
        }
    }
}

fn dispatch(notifications: Vec<Notification>) {
    for (callback, snapshot) in notifications {
        callback(&snapshot);
    }
}

/// Holds one `in_flight` slot for `key` across the network await.
///
/// A fetch future dropped before its response arrives releases the slot here
/// and tells listeners, so the key does not stay loading forever.
struct FlightGuard<'a> {
    shared: &'a Shared,
    key: PageKey,
    armed: bool,
}

impl<'a> FlightGuard<'a> {
    fn new(shared: &'a Shared, key: PageKey) -> Self {
        Self {
            shared,
            key,
            armed: true,
        }
    }

    /// The response arrived; `complete_fetch` releases the slot itself.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let notifications = {
            let mut state = self.shared.lock();
            state.finish_flight(self.key);
            state.stats.cancelled += 1;
            state.notifications()
        };
        debug!(key = %self.key, "page fetch cancelled");
        dispatch(notifications);
    }
}

/// Paginated collection cache.
///
/// Holds resolved pages keyed by `(page, page_size)`, serves the last
/// displayed page as placeholder while a new key loads, and never lets a
/// response for a superseded request replace what is displayed. Cloning is
/// cheap and clones share state; pass one handle to every view and
/// coordinator of a session.
#[derive(Clone)]
pub struct QueryCache {
    api: Arc<dyn RestaurantsApi>,
    shared: Arc<Shared>,
}

impl QueryCache {
    pub fn new(api: Arc<dyn RestaurantsApi>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        let state = CacheState {
            entries: LruCache::new(capacity),
            generation: 0,
            requested: None,
            displayed: None,
            in_flight: HashMap::new(),
            errors: HashMap::new(),
            listeners: HashMap::new(),
            next_listener_id: 1,
            stats: CacheStats::default(),
        };

        Self {
            api,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
            }),
        }
    }

    pub fn from_config(api: Arc<dyn RestaurantsApi>, config: &ClientConfig) -> Self {
        Self::new(api, config.cache_capacity)
    }

    pub fn api(&self) -> &Arc<dyn RestaurantsApi> {
        &self.api
    }

    /// Request one page and make it the displayed page once it resolves.
    ///
    /// A fresh entry is served without a network call. Otherwise the page is
    /// fetched; if another key was requested before the response arrives,
    /// the response is cached under its own key but not displayed.
    pub async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Arc<Page>> {
        let key = PageKey::new(page, page_size)?;
        self.fetch_key(key).await
    }

    pub async fn fetch_key(&self, key: PageKey) -> Result<Arc<Page>> {
        let mut round = 0;

        loop {
            let started_generation = match self.begin_fetch(key, round) {
                FetchStart::Hit(page) => return Ok(page),
                FetchStart::Network { generation } => generation,
            };

            debug!(key = %key, round, "fetching page");
            let flight = FlightGuard::new(&self.shared, key);
            let result = self.api.list(key.skip(), key.limit()).await;
            flight.disarm();

            match self.complete_fetch(key, started_generation, result) {
                FetchEnd::Applied(result) => return result,
                FetchEnd::Overtaken(page) => {
                    round += 1;
                    if round < MAX_REVALIDATION_ROUNDS {
                        debug!(key = %key, "cache invalidated during fetch, refetching");
                        continue;
                    }

                    warn!(key = %key, "cache kept changing during fetch, returning uncached page");
                    return Ok(page);
                }
            }
        }
    }

    fn begin_fetch(&self, key: PageKey, round: usize) -> FetchStart {
        let mut state = self.shared.lock();

        if round == 0 {
            state.requested = Some(key);

            if let Some(entry) = state.fresh(key) {
                state.stats.hits += 1;
                let page = entry.page.clone();
                state.displayed = Some(entry);
                let notifications = state.notifications();
                drop(state);

                dispatch(notifications);
                return FetchStart::Hit(page);
            }
            state.stats.misses += 1;
        }

        *state.in_flight.entry(key).or_default() += 1;
        state.errors.remove(&key);
        state.stats.fetches += 1;
        let generation = state.generation;
        let notifications = state.notifications();
        drop(state);

        dispatch(notifications);
        FetchStart::Network { generation }
    }

    fn complete_fetch(
        &self,
        key: PageKey,
        started_generation: u64,
        result: Result<RestaurantsPublic>,
    ) -> FetchEnd {
        let mut state = self.shared.lock();
        state.finish_flight(key);

        let outcome = match result {
            Err(err) => {
                warn!(key = %key, error = %err, "page fetch failed");
                state.errors.insert(key, err.clone());
                FetchEnd::Applied(Err(err))
            }
            Ok(response) => {
                let page = Arc::new(Page::from_response(key, response));

                if state.generation != started_generation {
                    state.stats.discarded += 1;
                    FetchEnd::Overtaken(page)
                } else {
                    let entry = CacheEntry {
                        page: page.clone(),
                        generation: state.generation,
                    };
                    state.entries.put(key, entry.clone());

                    if state.requested == Some(key) {
                        state.displayed = Some(entry);
                    } else {
                        state.stats.superseded += 1;
                        debug!(
                            key = %key,
                            requested = ?state.requested,
                            "response superseded by a newer request"
                        );
                    }
                    FetchEnd::Applied(Ok(page))
                }
            }
        };

        let notifications = state.notifications();
        drop(state);

        dispatch(notifications);
        outcome
    }

    /// Marks every cached page stale. The next read of any key refetches.
    pub fn invalidate(&self) {
        let notifications = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.stats.invalidations += 1;
            info!(
                generation = state.generation,
                cached_pages = state.entries.len(),
                "query cache invalidated"
            );
            state.notifications()
        };
        dispatch(notifications);
    }

    /// Re-reads the most recently requested key, if there is one.
    pub async fn refetch_active(&self) -> Option<Result<Arc<Page>>> {
        let key = self.requested()?;
        Some(self.fetch_key(key).await)
    }

    pub fn snapshot(&self, key: PageKey) -> QuerySnapshot {
        self.shared.lock().snapshot(key)
    }

    /// Register `callback` for `key`. It is called once immediately with the
    /// current snapshot, then after every state change, until the returned
    /// guard is dropped.
    pub fn subscribe<F>(&self, key: PageKey, callback: F) -> Subscription
    where
        F: Fn(&QuerySnapshot) + Send + Sync + 'static,
    {
        let callback: SnapshotCallback = Arc::new(callback);

        let (id, snapshot) = {
            let mut state = self.shared.lock();
            let id = state.next_listener_id;
            state.next_listener_id += 1;
            state
                .listeners
                .entry(key)
                .or_default()
                .push((id, callback.clone()));
            (id, state.snapshot(key))
        };

        callback(&snapshot);
        Subscription::new(Arc::downgrade(&self.shared), key, id)
    }

    pub fn listener_count(&self, key: PageKey) -> usize {
        self.shared
            .lock()
            .listeners
            .get(&key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// The page currently on screen: the last response for a key that was
    /// still the requested key when it arrived.
    pub fn displayed(&self) -> Option<Arc<Page>> {
        self.shared
            .lock()
            .displayed
            .as_ref()
            .map(|entry| entry.page.clone())
    }

    pub fn requested(&self) -> Option<PageKey> {
        self.shared.lock().requested
    }

    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.shared.lock().stats.clone()
    }
}
