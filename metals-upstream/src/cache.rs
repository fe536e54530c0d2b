//! In-memory quote cache.
//!
//! One entry per key, expired lazily on read. Growth is bounded only by
//! the number of distinct base currencies requested.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use metals_types::{PriceQuote, QuoteCache};

struct CacheEntry {
    quote: PriceQuote,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-wide quote cache. Create once and inject into the fetcher.
#[derive(Default)]
pub struct InMemoryQuoteCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryQuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QuoteCache for InMemoryQuoteCache {
    fn get(&self, key: &str) -> Option<PriceQuote> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if entry.is_live(now) {
                return Some(entry.quote.clone());
            }
        }

        // Shard guard is released above; a concurrent writer may have refreshed it.
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    fn insert(&self, key: String, quote: PriceQuote, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        tracing::debug!(%key, ttl_secs = ttl.as_secs(), "caching quote");
        self.entries.insert(key, CacheEntry { quote, expires_at });
    }
}
