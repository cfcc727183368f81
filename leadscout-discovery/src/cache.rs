//! In-memory TTL cache for assembled discovery results.
//!
//! Keyed by the (lowercased company name, company domain, enabled source
//! set) triple. Uses [`moka`] for async-friendly caching with TTL and
//! automatic eviction. Each engine owns its cache; a TTL of zero disables
//! it entirely.

use std::collections::BTreeSet;
use std::time::Duration;

use moka::future::Cache;

use crate::types::{DiscoveryResult, SourceKind};

/// Maximum number of cached results per engine.
const MAX_CACHE_ENTRIES: u64 = 1_000;

/// Composite cache key: normalised company name, domain and source set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    company: String,
    domain: String,
    sources: Vec<SourceKind>,
}

impl CacheKey {
    /// Build a deterministic key. Source order does not matter.
    pub fn new(company_name: &str, domain: &str, sources: &BTreeSet<SourceKind>) -> Self {
        Self {
            company: company_name.trim().to_lowercase(),
            domain: domain.trim().to_lowercase(),
            sources: sources.iter().copied().collect(),
        }
    }
}

/// Engine-owned result cache.
#[derive(Clone)]
pub struct ResultCache {
    inner: Option<Cache<CacheKey, DiscoveryResult>>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl ResultCache {
    /// Create a cache whose entries live for `ttl_seconds`; zero disables it.
    pub fn new(ttl_seconds: u64) -> Self {
        let inner = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up a cached result. Always a miss when disabled.
    pub async fn get(&self, key: &CacheKey) -> Option<DiscoveryResult> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    /// Store a result. No-op when disabled.
    pub async fn insert(&self, key: CacheKey, result: DiscoveryResult) {
        if let Some(cache) = &self.inner {
            cache.insert(key, result).await;
        }
    }
}
