//! In-memory TTL cache for fetched payloads.
//!
//! The cache is owned by the caller and lives outside the analytics
//! functions; nothing in the core consults it implicitly.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Collaborator endpoints whose payloads are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Full fund catalog.
    Catalog,
    /// NAV history and metadata of one scheme.
    FundDetail,
    /// Benchmark closing prices for a date range.
    Benchmark,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Catalog => "catalog",
            Endpoint::FundDetail => "fund_detail",
            Endpoint::Benchmark => "benchmark",
        }
    }

    /// Key for this endpoint with no parameters.
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.name())
    }
}

/// Cache key: the endpoint queried plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
        }
    }

    /// Add a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }
}

/// A cached value and the time it was fetched.
#[derive(Debug, Clone)]
pub struct CachedPayload<V> {
    pub value: V,
    pub fetched_at: Instant,
}

impl<V> CachedPayload<V> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) >= ttl
    }
}

/// Cache whose entries expire `ttl` after they were fetched.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<CacheKey, CachedPayload<V>>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<&V> {
        self.get_at(key, Instant::now())
    }

    /// Like [`get`](Self::get) with an explicit clock reading.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl, now))
            .map(|entry| &entry.value)
    }

    /// Store `value` as fetched now, replacing any previous entry.
    pub fn insert(&mut self, key: CacheKey, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: CacheKey, value: V, fetched_at: Instant) {
        self.entries.insert(key, CachedPayload { value, fetched_at });
    }

    /// Return the cached value or fetch, store and return a new one.
    ///
    /// A failed fetch leaves the cache unchanged.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: CacheKey, fetch: F) -> Result<&V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let now = Instant::now();
        let ttl = self.ttl;

        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(ttl, now) {
                    debug!("Cache entry for {} expired, refetching", occupied.key().endpoint);
                    let value = fetch()?;
                    occupied.insert(CachedPayload {
                        value,
                        fetched_at: Instant::now(),
                    });
                } else {
                    debug!("Cache hit for {}", occupied.key().endpoint);
                }
                Ok(&occupied.into_mut().value)
            }
            Entry::Vacant(vacant) => {
                debug!("Cache miss for {}", vacant.key().endpoint);
                let value = fetch()?;
                let entry = vacant.insert(CachedPayload {
                    value,
                    fetched_at: Instant::now(),
                });
                Ok(&entry.value)
            }
        }
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl, now));
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
