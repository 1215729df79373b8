//! Memoizing validation cache in front of a catalog provider.
//!
//! # Invariants
//! - Capacity is bounded; the least recently used identifier is evicted first.
//! - Positive and negative answers are both cached for the process lifetime.
//! - The lock is never held across a provider call.

use crate::catalog::CatalogProvider;
use crate::model::place::ExternalId;
use log::debug;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Size-bounded, thread-safe memo of `external_id -> exists`.
pub struct ValidationCache<P: CatalogProvider> {
    provider: P,
    entries: Mutex<LruCache<ExternalId, bool>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: CatalogProvider> ValidationCache<P> {
    /// Creates a cache with the default capacity.
    pub fn new(provider: P) -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_capacity(provider, capacity)
    }

    pub fn with_capacity(provider: P, capacity: NonZeroUsize) -> Self {
        Self {
            provider,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns whether the catalog knows `external_id`.
    ///
    /// Served from cache when possible; otherwise asks the provider once and
    /// remembers the answer. Unreachable providers yield `false`.
    pub fn is_valid_place(&self, external_id: ExternalId) -> bool {
        if let Some(valid) = self.entries.lock().get(&external_id).copied() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return valid;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let lookup = self.provider.lookup(external_id);
        let valid = lookup.is_found();
        self.entries.lock().put(external_id, valid);
        debug!(
            "event=catalog_cache_fill module=catalog status=ok external_id={external_id} outcome={} valid={valid}",
            lookup.as_str()
        );
        valid
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: entries.len(),
            capacity: entries.cap().get(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
