//! Process-wide cache of parsed SVG documents.
//!
//! Keyed by the source URL exactly as given, so `a.svg` and `a.svg?v=2`
//! are distinct resources. Entries have no TTL and no size bound: they live
//! until evicted, which only happens when a load fails.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use super::fetch_pipeline::{FetchPipeline, PendingFetch, RequestHandle};
use super::pending::PendingState;
use super::transport::{ReqwestTransport, Transport};
use crate::models::{SvgElement, TransportConfig};

/// Shared, pending-aware load of one resource
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub promise: PendingState<Arc<SvgElement>>,
    /// Transport handle, when the entry was created by a fetch
    pub request: Option<RequestHandle>,
}

impl CacheEntry {
    pub fn new(promise: PendingState<Arc<SvgElement>>, request: Option<RequestHandle>) -> Self {
        Self { promise, request }
    }

    pub fn is_pending(&self) -> bool {
        self.promise.is_pending()
    }
}

impl From<PendingFetch> for CacheEntry {
    fn from(fetch: PendingFetch) -> Self {
        Self::new(PendingState::wrap(fetch.future), Some(fetch.handle))
    }
}

/// Cache for loaded SVG documents, keyed by source URL
pub struct SvgCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    pipeline: FetchPipeline,
}

static GLOBAL_CACHE: OnceLock<Arc<SvgCache>> = OnceLock::new();

impl SvgCache {
    pub fn new(pipeline: FetchPipeline) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            pipeline,
        }
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(FetchPipeline::new(transport))
    }

    /// The process-wide cache, created on first access with a default
    /// reqwest transport.
    pub fn global() -> Arc<SvgCache> {
        Self::init_global(&TransportConfig::default())
    }

    /// Initialise the process-wide cache with the given transport settings.
    /// Only the first initialisation takes effect.
    pub fn init_global(config: &TransportConfig) -> Arc<SvgCache> {
        GLOBAL_CACHE
            .get_or_init(|| {
                tracing::debug!("Initialising global SVG cache");
                Arc::new(Self::with_transport(Arc::new(ReqwestTransport::new(config))))
            })
            .clone()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries().get(key).cloned()
    }

    /// Insert or replace the entry for `key`
    pub fn put(&self, key: impl Into<String>, entry: CacheEntry) {
        self.entries().insert(key.into(), entry);
    }

    /// Remove the entry for `key`
    pub fn evict(&self, key: &str) -> bool {
        let removed = self.entries().remove(key).is_some();
        if removed {
            tracing::debug!(key = %key, "SVG cache: evicted entry");
        }
        removed
    }

    /// Remove the entry for `key` only if it still holds `promise`.
    ///
    /// A consumer reacting to an old failure must not evict a retry that
    /// another consumer has started since.
    pub fn evict_entry(&self, key: &str, promise: &PendingState<Arc<SvgElement>>) -> bool {
        let mut entries = self.entries();
        let matches = entries
            .get(key)
            .is_some_and(|entry| entry.promise.ptr_eq(promise));
        if matches {
            entries.remove(key);
            tracing::debug!(key = %key, "SVG cache: evicted failed entry");
        }
        matches
    }

    /// Return the entry for `key`, creating it with `factory` if absent.
    ///
    /// Lookup and insertion happen under one lock, so callers racing on the
    /// same key share a single fetch. `factory` must not call back into the
    /// cache.
    pub fn get_or_create<F>(&self, key: &str, factory: F) -> CacheEntry
    where
        F: FnOnce() -> PendingFetch,
    {
        let mut entries = self.entries();
        if let Some(entry) = entries.get(key) {
            tracing::debug!(key = %key, pending = entry.is_pending(), "SVG cache hit");
            return entry.clone();
        }

        let entry = CacheEntry::from(factory());
        entries.insert(key.to_string(), entry.clone());
        tracing::debug!(key = %key, cache_size = entries.len(), "SVG cache: created entry");
        entry
    }

    /// [`SvgCache::get_or_create`] using this cache's fetch pipeline
    pub fn load(&self, key: &str) -> CacheEntry {
        self.get_or_create(key, || self.pipeline.fetch(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
