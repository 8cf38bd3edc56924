//! Response cache with provider-directed expiration.
//!
//! Entries live for the `cache_age` the provider sent, measured from the
//! moment they were stored; reads never extend that window. Responses
//! without a `cache_age`, and failed lookups, are not kept, so the next call
//! for that locator goes back to the loader.
//!
//! Loads are single-flight per locator: callers that miss while a load for
//! the same locator is running wait for it and share its result. Loads for
//! different locators run independently.

use async_trait::async_trait;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::defaults;
use crate::error::{OEmbedError, Result};
use crate::model::OEmbedResponse;

/// Produces the response for a locator on a cache miss.
///
/// Failures are reported as `None`.
#[async_trait]
pub trait ResponseLoader: Send + Sync {
    async fn load(&self, resource_url: &Url) -> Option<OEmbedResponse>;
}

/// Response cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Upper bound on stored locators; the least recently used one is evicted first.
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: defaults::cache::MAX_ENTRIES,
        }
    }
}

/// Cache entry with TTL support
struct CacheEntry {
    response: OEmbedResponse,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(response: OEmbedResponse, ttl: Duration) -> Self {
        Self {
            response,
            created_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

type InFlight = Arc<OnceCell<Option<OEmbedResponse>>>;

/// Locator-keyed cache in front of a [`ResponseLoader`].
pub struct ResponseCache {
    loader: Arc<dyn ResponseLoader>,
    entries: TokioMutex<LruCache<Url, CacheEntry>>,
    in_flight: TokioMutex<HashMap<Url, InFlight>>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache").finish_non_exhaustive()
    }
}

impl ResponseCache {
    pub fn new(loader: Arc<dyn ResponseLoader>, config: CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.max_entries).ok_or_else(|| {
            OEmbedError::ConfigurationError("Cache max_entries must be > 0".to_string())
        })?;

        Ok(Self {
            loader,
            entries: TokioMutex::new(LruCache::new(capacity)),
            in_flight: TokioMutex::new(HashMap::new()),
        })
    }

    /// Cached response for `resource_url`, loading it on a miss.
    pub async fn get(&self, resource_url: &Url) -> Option<OEmbedResponse> {
        if let Some(response) = self.lookup(resource_url).await {
            debug!(url = %resource_url, "oEmbed cache hit");
            return Some(response);
        }

        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            // A load may have been stored between the first lookup and this lock.
            if let Some(response) = self.lookup(resource_url).await {
                debug!(url = %resource_url, "oEmbed cache hit");
                return Some(response);
            }
            // An initialized slot was left behind by a caller that never
            // retired it. Its result is stale, so start a fresh load.
            let slot = in_flight
                .entry(resource_url.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()));
            if slot.initialized() {
                *slot = Arc::new(OnceCell::new());
            }
            slot.clone()
        };

        // The loading waiter stores the result before the cell is
        // initialized, so by the time any waiter sees a value it is in
        // `entries` (when cacheable) and the slot can go.
        let response = cell
            .get_or_init(|| async {
                debug!(url = %resource_url, "oEmbed cache miss");
                let response = self.loader.load(resource_url).await;
                self.store(resource_url, response.as_ref()).await;
                response
            })
            .await
            .clone();

        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(resource_url)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            in_flight.remove(resource_url);
        }

        response
    }

    async fn store(&self, resource_url: &Url, response: Option<&OEmbedResponse>) {
        let Some(response) = response else {
            return;
        };
        let Some(ttl) = response.cache_age().filter(|ttl| !ttl.is_zero()) else {
            return;
        };
        let mut entries = self.entries.lock().await;
        entries.put(resource_url.clone(), CacheEntry::new(response.clone(), ttl));
        debug!(url = %resource_url, ttl_secs = ttl.as_secs(), "oEmbed response cached");
    }

    async fn lookup(&self, resource_url: &Url) -> Option<OEmbedResponse> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(resource_url) {
            if !entry.is_expired() {
                return Some(entry.response.clone());
            }
            entries.pop(resource_url);
        }
        None
    }

    /// Drop the entry for `resource_url`, if any.
    pub async fn invalidate(&self, resource_url: &Url) {
        self.entries.lock().await.pop(resource_url);
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries, expired ones included until they are next read.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
