//! Keyed in-memory resource cache with explicit freshness states.
//!
//! Traditional caches hide their staleness; this one makes it explicit.
//! Every entry carries a status (fetching, fresh, stale, error), concurrent
//! reads of one key collapse onto a single outbound fetch, and a per-key
//! generation counter guarantees a slower, superseded fetch can never
//! overwrite newer data. Subscribers are notified on every state or data
//! change of their key.

use crate::fetcher::ResourceFetcher;
use ledgerkit_core::{ClientError, ResourceKey};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc};

/// Freshness state of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// A fetch is in flight; new reads attach to it instead of duplicating.
    Fetching,
    /// Cached data is current; reads return it without refetching.
    Fresh,
    /// Cached data may be outdated; the next read refetches.
    Stale,
    /// The last fetch failed; the next read retries.
    Error,
}

/// Notification delivered to subscribers of a key.
#[derive(Debug, Clone)]
pub struct CacheEvent {
    pub key: ResourceKey,
    pub status: EntryStatus,
    /// Present on transitions that carry new data (a successful fetch).
    pub data: Option<Value>,
}

/// Observable state of one entry, for tests and UI inspection.
#[derive(Debug, Clone)]
pub struct EntrySnapshot {
    pub status: EntryStatus,
    pub data: Option<Value>,
    pub generation: u64,
    pub last_error: Option<ClientError>,
}

#[derive(Debug)]
struct Entry {
    status: EntryStatus,
    data: Option<Value>,
    /// Monotonic per-key counter, bumped at every fetch start and every
    /// invalidation. A completing fetch only stores its result if the
    /// counter still matches the value it started with.
    generation: u64,
    last_error: Option<ClientError>,
    inflight: Option<broadcast::Sender<Result<Value, ClientError>>>,
}

impl Entry {
    fn new() -> Self {
        Self {
            status: EntryStatus::Stale,
            data: None,
            generation: 0,
            last_error: None,
            inflight: None,
        }
    }

    /// Transition to fetching under a new generation.
    fn begin_fetch(&mut self) -> ReadPlan {
        self.generation += 1;
        self.status = EntryStatus::Fetching;
        let (tx, _) = broadcast::channel(1);
        self.inflight = Some(tx.clone());
        ReadPlan::Fetch {
            generation: self.generation,
            tx,
        }
    }
}

enum ReadPlan {
    Hit(Value),
    Attach(broadcast::Receiver<Result<Value, ClientError>>),
    Fetch {
        generation: u64,
        tx: broadcast::Sender<Result<Value, ClientError>>,
    },
}

/// Resets an entry whose fetching `read` future was dropped before
/// completion (task abort, timeout). Without this the entry would stay
/// fetching forever, with every later read attached to a channel nobody
/// will ever send on.
struct FetchGuard<'a> {
    cache: &'a ResourceCache,
    key: &'a ResourceKey,
    generation: u64,
    done: bool,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let abandoned = {
            let mut entries = self.cache.lock_entries();
            match entries.get_mut(self.key) {
                Some(entry)
                    if entry.generation == self.generation
                        && entry.status == EntryStatus::Fetching =>
                {
                    entry.status = EntryStatus::Stale;
                    entry.inflight = None;
                    true
                }
                _ => false,
            }
        };
        if abandoned {
            tracing::debug!(key = %self.key, "read dropped mid-fetch, entry reset to stale");
            self.cache.notify(self.key, EntryStatus::Stale, None);
        }
    }
}

/// Process-wide cache of server-backed resources.
///
/// At most one entry exists per key. Entries are mutated only by this type's
/// own read/invalidate operations. The interior locks are plain mutexes,
/// never held across an await, so drop guards can restore consistency even
/// when a caller's future is dropped mid-operation.
#[derive(Default)]
pub struct ResourceCache {
    entries: Mutex<HashMap<ResourceKey, Entry>>,
    subscribers: Mutex<HashMap<ResourceKey, Vec<mpsc::UnboundedSender<CacheEvent>>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<ResourceKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a resource, consulting the cache first.
    ///
    /// - Fresh entry: returns the cached value without invoking the fetcher.
    /// - Fetching entry: attaches to the in-flight fetch and resolves with
    ///   its eventual result.
    /// - Stale, errored, or absent entry: starts a fetch; on success the
    ///   entry becomes fresh, on failure it enters the error state and the
    ///   failure propagates to every attached caller.
    ///
    /// Dropping this future mid-fetch resets the entry to stale, so the
    /// next read simply fetches again.
    pub async fn read<F>(&self, key: &ResourceKey, fetcher: &F) -> Result<Value, ClientError>
    where
        F: ResourceFetcher + ?Sized,
    {
        loop {
            let plan = {
                let mut entries = self.lock_entries();
                let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
                match entry.status {
                    EntryStatus::Fresh => {
                        if let Some(data) = &entry.data {
                            ReadPlan::Hit(data.clone())
                        } else {
                            entry.begin_fetch()
                        }
                    }
                    EntryStatus::Fetching => {
                        if let Some(tx) = &entry.inflight {
                            ReadPlan::Attach(tx.subscribe())
                        } else {
                            entry.begin_fetch()
                        }
                    }
                    EntryStatus::Stale | EntryStatus::Error => entry.begin_fetch(),
                }
            };

            match plan {
                ReadPlan::Hit(data) => {
                    tracing::debug!(%key, "cache hit");
                    return Ok(data);
                }
                ReadPlan::Attach(mut rx) => {
                    tracing::debug!(%key, "attaching to in-flight fetch");
                    match rx.recv().await {
                        Ok(result) => return result,
                        // The fetching read was dropped before completing.
                        // Its guard has already reset the entry to stale, so
                        // go around again and run the fetch ourselves.
                        Err(_) => continue,
                    }
                }
                ReadPlan::Fetch { generation, tx } => {
                    tracing::debug!(%key, generation, "cache miss, fetching");
                    let mut guard = FetchGuard {
                        cache: self,
                        key,
                        generation,
                        done: false,
                    };
                    self.notify(key, EntryStatus::Fetching, None);
                    let result = fetcher.fetch(key).await;
                    self.complete_fetch(key, generation, &result);
                    guard.done = true;
                    let _ = tx.send(result.clone());
                    return result;
                }
            }
        }
    }

    /// Store a completed fetch, unless a newer generation superseded it.
    fn complete_fetch(&self, key: &ResourceKey, generation: u64, result: &Result<Value, ClientError>) {
        let event = {
            let mut entries = self.lock_entries();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            if entry.generation != generation {
                tracing::debug!(%key, generation, current = entry.generation, "discarding superseded fetch result");
                return;
            }
            entry.inflight = None;
            match result {
                Ok(data) => {
                    entry.status = EntryStatus::Fresh;
                    entry.data = Some(data.clone());
                    entry.last_error = None;
                    (EntryStatus::Fresh, Some(data.clone()))
                }
                Err(err) => {
                    entry.status = EntryStatus::Error;
                    entry.last_error = Some(err.clone());
                    (EntryStatus::Error, None)
                }
            }
        };
        self.notify(key, event.0, event.1);
    }

    /// Mark an entry stale if present. Does not refetch.
    ///
    /// Any in-flight fetch for the key is superseded: its result will be
    /// discarded on arrival rather than stored as fresh.
    pub fn invalidate(&self, key: &ResourceKey) {
        let present = {
            let mut entries = self.lock_entries();
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.generation += 1;
                    entry.inflight = None;
                    entry.status = EntryStatus::Stale;
                    true
                }
                None => false,
            }
        };
        if present {
            tracing::debug!(%key, "invalidated");
            self.notify(key, EntryStatus::Stale, None);
        }
    }

    /// Mark stale and immediately refetch, so the entry is fresh (or in the
    /// error state) again before this returns. Used by the mutation
    /// coordinator so callers never observe a stale window after a mutation.
    pub async fn invalidate_and_refetch<F>(
        &self,
        key: &ResourceKey,
        fetcher: &F,
    ) -> Result<Value, ClientError>
    where
        F: ResourceFetcher + ?Sized,
    {
        self.invalidate(key);
        self.read(key, fetcher).await
    }

    /// Register for change notifications on a key. The receiver is pruned
    /// automatically once dropped.
    pub fn subscribe(&self, key: &ResourceKey) -> mpsc::UnboundedReceiver<CacheEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .push(tx);
        rx
    }

    /// Observable state of a key, or `None` if never read.
    pub fn snapshot(&self, key: &ResourceKey) -> Option<EntrySnapshot> {
        let entries = self.lock_entries();
        entries.get(key).map(|entry| EntrySnapshot {
            status: entry.status,
            data: entry.data.clone(),
            generation: entry.generation,
            last_error: entry.last_error.clone(),
        })
    }

    /// Drop all entries. Used on sign-out so no financial data outlives the
    /// session.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    fn notify(&self, key: &ResourceKey, status: EntryStatus, data: Option<Value>) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(senders) = subscribers.get_mut(key) {
            senders.retain(|tx| {
                tx.send(CacheEvent {
                    key: key.clone(),
                    status,
                    data: data.clone(),
                })
                .is_ok()
            });
            if senders.is_empty() {
                subscribers.remove(key);
            }
        }
    }
}
