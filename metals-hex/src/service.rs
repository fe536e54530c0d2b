//! Price Fetcher Service
//!
//! Produces a fresh or cached gold/silver quote for a base currency.
//! Contains NO infrastructure logic - transport and cache are injected ports.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use metals_types::domain::currency::MIN_CODE_LEN;
use metals_types::domain::quote::quote_timestamp;
use metals_types::{
    BaseCurrency, FetchError, MetalRates, MetalpriceLatestResponse, PriceQuote, QuoteCache,
    UpstreamTransport,
};

/// Primary environment variable holding the MetalpriceAPI key.
pub const API_KEY_ENV: &str = "METALPRICE_API_KEY";
/// Variable name used with the previous provider, still honored.
pub const LEGACY_API_KEY_ENV: &str = "METALS_API_KEY";
/// Value shipped in sample configs; never a real key.
pub const API_KEY_PLACEHOLDER: &str = "REPLACE_ME";

pub const MIN_CACHE_SECONDS: u64 = 1;
pub const MAX_CACHE_SECONDS: u64 = 3600;
pub const DEFAULT_CACHE_SECONDS: u64 = 10;

const LATEST_PATH: &str = "latest";
const METALS: &str = "XAU,XAG";
const MISSING_KEY: &str = "Missing API key. Set METALPRICE_API_KEY (recommended) or configure metalprice_api.api_key in the config file.";
const UNKNOWN_UPSTREAM_ERROR: &str = "Unknown MetalpriceAPI error.";

/// Invalid fetcher settings, reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Base currency must be at least 3 characters, got {0:?}")]
    BaseCurrency(String),

    #[error("Cache seconds must be between 1 and 3600, got {0}")]
    CacheSeconds(u64),
}

/// One place an API key may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Read from the named environment variable at fetch time.
    Env(String),
    /// Value from the config file.
    Configured(Option<String>),
}

impl KeySource {
    /// Env primary, env legacy, then the configured value.
    pub fn default_chain(configured: Option<String>) -> Vec<KeySource> {
        vec![
            KeySource::Env(API_KEY_ENV.to_string()),
            KeySource::Env(LEGACY_API_KEY_ENV.to_string()),
            KeySource::Configured(configured),
        ]
    }

    fn lookup(&self, env: &impl Fn(&str) -> Option<String>) -> Option<String> {
        match self {
            KeySource::Env(name) => env(name),
            KeySource::Configured(value) => value.clone(),
        }
    }
}

/// Walks the priority list; the first non-blank (trimmed) value wins.
pub fn resolve_api_key(
    sources: &[KeySource],
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, FetchError> {
    let key = sources
        .iter()
        .filter_map(|source| source.lookup(&env))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty());

    match key {
        Some(key) if !key.eq_ignore_ascii_case(API_KEY_PLACEHOLDER) => Ok(key),
        _ => Err(FetchError::Configuration(MISSING_KEY.into())),
    }
}

/// Validated settings of the price fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub default_base_currency: BaseCurrency,
    pub cache_ttl: Duration,
    pub key_sources: Vec<KeySource>,
}

impl FetcherConfig {
    pub fn new(
        default_base_currency: &str,
        cache_seconds: u64,
        key_sources: Vec<KeySource>,
    ) -> Result<Self, ConfigError> {
        let default_base_currency = BaseCurrency::parse(default_base_currency)
            .filter(|code| code.as_str().chars().count() >= MIN_CODE_LEN)
            .ok_or_else(|| ConfigError::BaseCurrency(default_base_currency.to_string()))?;

        if !(MIN_CACHE_SECONDS..=MAX_CACHE_SECONDS).contains(&cache_seconds) {
            return Err(ConfigError::CacheSeconds(cache_seconds));
        }

        Ok(Self {
            default_base_currency,
            cache_ttl: Duration::from_secs(cache_seconds),
            key_sources,
        })
    }
}

/// Turns an upstream `latest` body into a quote.
pub fn parse_quote(
    base: &BaseCurrency,
    body: &str,
    now: DateTime<Utc>,
) -> Result<PriceQuote, FetchError> {
    let parsed: MetalpriceLatestResponse = serde_json::from_str(body).map_err(|e| {
        FetchError::Configuration(format!(
            "MetalpriceAPI response was empty or invalid JSON: {e}"
        ))
    })?;

    if parsed.success == Some(false) {
        let message = parsed
            .error
            .and_then(|error| error.info)
            .unwrap_or_else(|| UNKNOWN_UPSTREAM_ERROR.to_string());
        return Err(FetchError::Configuration(message));
    }

    let rates = MetalRates::from_table(parsed.rates.as_ref())?;
    let timestamp_utc = quote_timestamp(parsed.timestamp, now)?;

    Ok(PriceQuote::from_rates(base, timestamp_utc, rates)?)
}

/// Application service for metal prices.
///
/// Generic over its ports - adapters are injected at construction time.
/// One upstream attempt per cache miss; retrying is left to the caller.
pub struct PriceFetcher<T: UpstreamTransport, C: QuoteCache> {
    transport: T,
    cache: C,
    config: FetcherConfig,
}

impl<T: UpstreamTransport, C: QuoteCache> PriceFetcher<T, C> {
    pub fn new(transport: T, cache: C, config: FetcherConfig) -> Self {
        Self {
            transport,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Returns the latest quote for `base_currency` (or the default one).
    ///
    /// Cancelling `cancel` aborts the in-flight upstream request.
    #[tracing::instrument(skip(self, cancel), fields(base = tracing::field::Empty))]
    pub async fn fetch_latest(
        &self,
        base_currency: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<PriceQuote, FetchError> {
        let base = BaseCurrency::resolve(base_currency, &self.config.default_base_currency);
        tracing::Span::current().record("base", base.as_str());

        let api_key = resolve_api_key(&self.config.key_sources, |name| std::env::var(name).ok())?;

        let cache_key = base.cache_key();
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("cache hit");
            return Ok(cached);
        }

        let query = [
            ("api_key", api_key.as_str()),
            ("base", base.as_str()),
            ("currencies", METALS),
        ];

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("caller cancelled before upstream responded");
                return Err(FetchError::Cancelled);
            }
            result = self.transport.get(LATEST_PATH, &query) => result?,
        };

        if !response.is_ok() {
            let reason = response
                .reason
                .map(|reason| format!(" {reason}"))
                .unwrap_or_default();
            return Err(FetchError::Upstream(format!(
                "MetalpriceAPI returned {}{}. Body: {}",
                response.status, reason, response.body
            )));
        }

        let quote = parse_quote(&base, &response.body, Utc::now())?;
        tracing::info!(
            gold = %quote.gold_per_ounce,
            silver = %quote.silver_per_ounce,
            "fetched latest quote"
        );

        self.cache
            .insert(cache_key, quote.clone(), self.config.cache_ttl);
        Ok(quote)
    }
}
