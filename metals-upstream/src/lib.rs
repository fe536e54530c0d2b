//! # Metals Upstream
//!
//! Concrete adapters for the outbound ports of the metal prices service:
//! - `metalprice` - reqwest-backed `UpstreamTransport` for MetalpriceAPI
//! - `cache` - DashMap-backed `QuoteCache` with passive TTL expiry

pub mod cache;
pub mod metalprice;

pub use cache::InMemoryQuoteCache;
pub use metalprice::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MetalpriceTransport};
