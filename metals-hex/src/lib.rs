//! # Metals Hex
//!
//! Application service layer and HTTP adapter for the metal prices service.
//!
//! ## Architecture
//!
//! - `service/` - Price fetcher (resolve, cache, fetch, normalize)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The fetcher is generic over `T: UpstreamTransport` and `C: QuoteCache`,
//! allowing different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{ConfigError, FetcherConfig, KeySource, PriceFetcher};
