//! Error types for the metal prices service.

/// Violations found while turning upstream rates into a quote.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("MetalpriceAPI response missing XAU/XAG rates.")]
    MissingRates,

    #[error("MetalpriceAPI returned non-positive rates.")]
    NonPositiveRate,

    #[error("MetalpriceAPI returned a rate outside the decimal range: {0}")]
    UnrepresentableRate(String),

    #[error("Computed price rounds to zero at two decimal places")]
    BelowPrecision,

    #[error("MetalpriceAPI returned an invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Transport-level failures talking to the upstream provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Request to MetalpriceAPI timed out")]
    Timeout,

    #[error("Request to MetalpriceAPI failed: {0}")]
    Network(String),
}

/// Errors surfaced by the price fetcher.
///
/// Maps cleanly to HTTP status codes:
/// - `Configuration` is our (or the upstream contract's) problem: 500
/// - `Upstream` is their outage: 502
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Request cancelled by caller")]
    Cancelled,
}

impl From<QuoteError> for FetchError {
    fn from(err: QuoteError) -> Self {
        FetchError::Configuration(err.to_string())
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        FetchError::Upstream(err.to_string())
    }
}
