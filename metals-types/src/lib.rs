//! # Metals Types
//!
//! Domain types and port traits for the metal prices service.
//! This crate has ZERO IO dependencies - only data structures,
//! normalization rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (PriceQuote, BaseCurrency, MetalRates)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for the inbound and upstream wire formats
//! - `error/` - Fetch and transport error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{BaseCurrency, MetalRates, PriceQuote};
pub use dto::*;
pub use error::{FetchError, QuoteError, TransportError};
pub use ports::{QuoteCache, UpstreamResponse, UpstreamTransport};
