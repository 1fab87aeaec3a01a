use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{CacheData, CacheEntry, QueryKey};
use crate::api::{ErrorInfo, ErrorKind, UserApi};
use crate::models::UserRecord;

type FetchOutcome = Result<CacheData, ErrorInfo>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

struct Slot {
    entry: watch::Sender<CacheEntry>,
    /// Generation tag and handle of the fetch readers should join.
    in_flight: Option<(u64, SharedFetch)>,
}

impl Slot {
    fn new() -> Self {
        let (entry, _) = watch::channel(CacheEntry::default());
        Self {
            entry,
            in_flight: None,
        }
    }

    /// Forget the in-flight fetch. Readers already attached still get its result.
    fn detach(&mut self) {
        self.in_flight = None;
    }
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<QueryKey, Slot>,
    next_generation: u64,
}

struct Inner {
    api: Arc<dyn UserApi>,
    state: Mutex<CacheState>,
}

impl Inner {
    // The lock is never held across an await, so a poisoned state is still consistent.
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a fetch result unless the fetch was detached in the meantime.
    fn settle(&self, key: &QueryKey, generation: u64, outcome: &FetchOutcome) {
        let mut state = self.lock_state();
        let Some(slot) = state.slots.get_mut(key) else {
            debug!(key = %key, "Cache was reset, dropping fetch result");
            return;
        };
        match &slot.in_flight {
            Some((current, _)) if *current == generation => {}
            _ => {
                debug!(key = %key, generation, "Discarding result of detached fetch");
                return;
            }
        }
        slot.in_flight = None;

        match outcome {
            Ok(data) => {
                debug!(key = %key, "Fetch succeeded");
                slot.entry.send_modify(|entry| entry.settle_success(data.clone()));
            }
            Err(e) => {
                warn!(key = %key, kind = %e.kind, error = %e.detail, "Fetch failed");
                slot.entry.send_modify(|entry| entry.settle_error(e.clone()));
            }
        }
    }
}

async fn fetch_key(api: &dyn UserApi, key: &QueryKey) -> FetchOutcome {
    let result = match key {
        QueryKey::Users => api.list_users().await.map(CacheData::List),
        QueryKey::User(id) => api.get_user(id).await.map(CacheData::Record),
    };
    result.map_err(|e| ErrorInfo::from(&e))
}

/// Query cache for the users collection.
///
/// Built once per session and passed around by clone; clones share state.
/// Reads require a running tokio runtime because each fetch runs as its own
/// task, so a reader that gives up does not cancel it.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Return the cached value for `key`, fetching it when absent or stale.
    ///
    /// Concurrent callers for the same key share one request and all receive
    /// its value or its error. A fresh error is returned as-is; only
    /// invalidation causes another attempt.
    pub async fn read(&self, key: &QueryKey) -> FetchOutcome {
        let fetch = {
            let mut guard = self.inner.lock_state();
            let CacheState {
                slots,
                next_generation,
            } = &mut *guard;
            let slot = slots.entry(key.clone()).or_insert_with(Slot::new);

            if let Some((_, fetch)) = &slot.in_flight {
                debug!(key = %key, "Joining in-flight fetch");
                fetch.clone()
            } else {
                {
                    let entry = slot.entry.borrow();
                    if !entry.needs_fetch() {
                        if let Some(error) = &entry.error {
                            return Err(error.clone());
                        }
                        if let Some(data) = &entry.data {
                            debug!(key = %key, "Cache hit");
                            return Ok(data.clone());
                        }
                    }
                }

                *next_generation += 1;
                let generation = *next_generation;
                let fetch = self.spawn_fetch(key.clone(), generation);
                slot.in_flight = Some((generation, fetch.clone()));
                slot.entry.send_modify(CacheEntry::mark_pending);
                debug!(key = %key, generation, "Cache miss, fetching");
                fetch
            }
        };

        fetch.await
    }

    fn spawn_fetch(&self, key: QueryKey, generation: u64) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let outcome = fetch_key(inner.api.as_ref(), &key).await;
            inner.settle(&key, generation, &outcome);
            outcome
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                Err(ErrorInfo::new(
                    ErrorKind::Transport,
                    format!("Fetch task failed: {}", e),
                ))
            })
        }
        .boxed()
        .shared()
    }

    /// `read(["users"])`
    pub async fn read_users(&self) -> Result<Vec<UserRecord>, ErrorInfo> {
        match self.read(&QueryKey::Users).await? {
            CacheData::List(users) => Ok(users),
            CacheData::Record(_) => Err(mismatched(&QueryKey::Users)),
        }
    }

    /// `read(["users", id])`
    pub async fn read_user(&self, id: &str) -> Result<UserRecord, ErrorInfo> {
        let key = QueryKey::user(id);
        match self.read(&key).await? {
            CacheData::Record(user) => Ok(user),
            CacheData::List(_) => Err(mismatched(&key)),
        }
    }

    /// Mark each listed key stale. Nothing is fetched until the next read.
    ///
    /// Keys are matched exactly; invalidating `["users"]` leaves
    /// `["users", id]` alone.
    pub fn invalidate<'a>(&self, keys: impl IntoIterator<Item = &'a QueryKey>) {
        let mut state = self.inner.lock_state();
        for key in keys {
            if let Some(slot) = state.slots.get_mut(key) {
                slot.detach();
                slot.entry.send_modify(|entry| entry.stale = true);
                debug!(key = %key, "Invalidated");
            }
        }
    }

    /// Drop the entry for `key` unless someone is subscribed to it, in which
    /// case it is only marked stale. Either way the next read re-fetches.
    pub fn forget(&self, key: &QueryKey) {
        let mut state = self.inner.lock_state();
        let Some(slot) = state.slots.get_mut(key) else {
            return;
        };
        if slot.entry.receiver_count() == 0 {
            state.slots.remove(key);
            debug!(key = %key, "Evicted");
        } else {
            slot.detach();
            slot.entry.send_modify(|entry| entry.stale = true);
            debug!(key = %key, "Invalidated, entry has subscribers");
        }
    }

    /// Seed `key` with a fresh value, replacing any in-flight fetch.
    pub fn write(&self, key: QueryKey, data: CacheData) {
        let mut state = self.inner.lock_state();
        let slot = state.slots.entry(key.clone()).or_insert_with(Slot::new);
        slot.detach();
        slot.entry.send_modify(|entry| entry.settle_success(data));
        debug!(key = %key, "Seeded cache entry");
    }

    /// Current snapshot for `key` without fetching.
    pub fn peek(&self, key: &QueryKey) -> Option<CacheEntry> {
        let state = self.inner.lock_state();
        state.slots.get(key).map(|slot| slot.entry.borrow().clone())
    }

    /// Receive every state change of `key`, starting from its current entry.
    ///
    /// The channel closes when the cache is `reset`.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<CacheEntry> {
        let mut state = self.inner.lock_state();
        state
            .slots
            .entry(key.clone())
            .or_insert_with(Slot::new)
            .entry
            .subscribe()
    }

    /// Drop every entry. In-flight fetches finish but are not stored.
    pub fn reset(&self) {
        let mut state = self.inner.lock_state();
        let dropped = state.slots.len();
        state.slots.clear();
        debug!(entries = dropped, "Cache reset");
    }
}

fn mismatched(key: &QueryKey) -> ErrorInfo {
    ErrorInfo::new(
        ErrorKind::Transport,
        format!("Cached data for {} has the wrong shape", key),
    )
}

// ============================================================================
// Tests
// ============================================================================
