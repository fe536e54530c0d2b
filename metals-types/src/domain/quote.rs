//! Price quote and the rate normalization that produces it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::{BaseCurrency, GOLD, SILVER};
use crate::error::QuoteError;

/// Fractional digits kept on per-ounce prices.
pub const PRICE_DECIMALS: u32 = 2;

/// Raw upstream rates: ounces of metal per 1 unit of the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetalRates {
    pub xau: Decimal,
    pub xag: Decimal,
}

impl MetalRates {
    /// Picks the gold and silver rates out of an upstream rate table.
    pub fn from_table(rates: Option<&HashMap<String, f64>>) -> Result<Self, QuoteError> {
        let rates = rates.ok_or(QuoteError::MissingRates)?;
        let (Some(&xau), Some(&xag)) = (rates.get(GOLD), rates.get(SILVER)) else {
            return Err(QuoteError::MissingRates);
        };

        Ok(Self {
            xau: to_decimal(xau)?,
            xag: to_decimal(xag)?,
        })
    }
}

fn to_decimal(rate: f64) -> Result<Decimal, QuoteError> {
    match Decimal::from_f64(rate) {
        // Positive but below the smallest representable decimal
        Some(value) if value.is_zero() && rate > 0.0 => {
            Err(QuoteError::UnrepresentableRate(rate.to_string()))
        }
        Some(value) => Ok(value),
        None => Err(QuoteError::UnrepresentableRate(rate.to_string())),
    }
}

/// Inverts a "metal per currency unit" rate into "currency per ounce",
/// rounded half to even at [`PRICE_DECIMALS`] and always carrying that scale.
pub fn price_per_ounce(rate: Decimal) -> Result<Decimal, QuoteError> {
    if rate <= Decimal::ZERO {
        return Err(QuoteError::NonPositiveRate);
    }

    let mut price = Decimal::ONE
        .checked_div(rate)
        .ok_or_else(|| QuoteError::UnrepresentableRate(rate.to_string()))?
        .round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointNearestEven);

    if price <= Decimal::ZERO {
        return Err(QuoteError::BelowPrecision);
    }
    price.rescale(PRICE_DECIMALS);
    Ok(price)
}

/// Converts the upstream epoch-seconds timestamp, falling back to `now`.
pub fn quote_timestamp(
    epoch_seconds: Option<i64>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, QuoteError> {
    match epoch_seconds {
        Some(secs) => DateTime::from_timestamp(secs, 0).ok_or(QuoteError::InvalidTimestamp(secs)),
        None => Ok(now),
    }
}

/// Latest gold and silver prices expressed in a base currency per troy ounce.
///
/// Both prices are strictly positive whenever a quote exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Currency the prices are expressed in
    #[schema(example = "USD")]
    pub base_currency: String,
    /// When the upstream rates were computed
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub timestamp_utc: DateTime<Utc>,
    /// Gold price per troy ounce
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 2034.56)]
    pub gold_per_ounce: Decimal,
    /// Silver price per troy ounce
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    #[schema(value_type = f64, example = 23.10)]
    pub silver_per_ounce: Decimal,
    /// Display unit
    #[schema(example = "USD per oz")]
    pub unit: String,
}

impl PriceQuote {
    /// Builds a quote from raw upstream rates.
    pub fn from_rates(
        base: &BaseCurrency,
        timestamp_utc: DateTime<Utc>,
        rates: MetalRates,
    ) -> Result<Self, QuoteError> {
        let gold_per_ounce = price_per_ounce(rates.xau)?;
        let silver_per_ounce = price_per_ounce(rates.xag)?;

        Ok(Self {
            base_currency: base.as_str().to_string(),
            timestamp_utc,
            gold_per_ounce,
            silver_per_ounce,
            unit: base.unit(),
        })
    }
}
