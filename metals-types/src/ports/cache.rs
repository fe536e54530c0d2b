//! Quote cache port.

use std::time::Duration;

use crate::domain::PriceQuote;

/// Short-lived quote cache keyed by string.
///
/// Implementations must be safe under concurrent access. Expired entries
/// must read as absent; no background eviction is required.
pub trait QuoteCache: Send + Sync + 'static {
    /// Returns the live entry for `key`, if any.
    fn get(&self, key: &str) -> Option<PriceQuote>;

    /// Stores `quote` under `key` for `ttl`, replacing any previous entry.
    fn insert(&self, key: String, quote: PriceQuote, ttl: Duration);
}
