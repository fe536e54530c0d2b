//! Domain models for the metal prices service.

pub mod currency;
pub mod quote;

pub use currency::BaseCurrency;
pub use quote::{MetalRates, PriceQuote};
