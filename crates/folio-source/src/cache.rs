//! Time-to-live cache in front of a source.
//!
//! One timestamped entry per collection. Entries expire after the TTL and can be
//! dropped early with [`CachedSource::clear`] / [`CachedSource::clear_all`].
//! Failed fetches are never cached.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use folio_core::RawRecord;
use scc::HashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::{ContentSource, Result};

/// Default time-to-live: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Instant,
    records: Arc<Vec<RawRecord>>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Caching wrapper around any [`ContentSource`].
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl<S: ContentSource> CachedSource<S> {
    /// Wrap `inner` with the default TTL.
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    /// Wrap `inner` with a custom TTL. A zero TTL disables caching.
    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: HashMap::new(),
        }
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the entry for one collection. Returns whether one existed.
    pub async fn clear(&self, collection: &str) -> bool {
        self.entries.remove_async(collection).await.is_some()
    }

    /// Drop every entry.
    pub fn clear_all(&self) {
        self.entries.clear_sync();
    }

    /// Number of cached collections, fresh or not.
    pub fn cached_count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl<S: ContentSource> ContentSource for CachedSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
        if self.ttl.is_zero() {
            return self.inner.fetch(collection).await;
        }

        let cached = match self.entries.get_async(collection).await {
            Some(entry) if entry.get().is_fresh(self.ttl) => Some(Arc::clone(&entry.get().records)),
            _ => None,
        };
        if let Some(records) = cached {
            debug!(collection, count = records.len(), "cache hit");
            return Ok(records.as_ref().clone());
        }

        let records = self.inner.fetch(collection).await?;
        debug!(collection, count = records.len(), "cache refreshed");
        let entry = CacheEntry {
            fetched_at: Instant::now(),
            records: Arc::new(records.clone()),
        };
        let _ = self.entries.upsert_async(collection.to_string(), entry).await;
        Ok(records)
    }
}
