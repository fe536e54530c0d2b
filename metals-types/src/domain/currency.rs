//! Base currency in which metal prices are quoted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream code for gold.
pub const GOLD: &str = "XAU";
/// Upstream code for silver.
pub const SILVER: &str = "XAG";

/// Minimum length of a configured default base currency code.
pub const MIN_CODE_LEN: usize = 3;

/// Normalized (trimmed, uppercase) base currency code such as `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseCurrency(String);

impl BaseCurrency {
    /// Normalizes raw caller input. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim();
        if code.is_empty() {
            return None;
        }
        Some(Self(code.to_uppercase()))
    }

    /// Picks the caller's currency when given, otherwise the fallback.
    pub fn resolve(requested: Option<&str>, fallback: &BaseCurrency) -> Self {
        requested
            .and_then(Self::parse)
            .unwrap_or_else(|| fallback.clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the latest quote for this currency is cached.
    pub fn cache_key(&self) -> String {
        format!("latest:{}", self.0)
    }

    /// Display unit for prices in this currency, e.g. `USD per oz`.
    pub fn unit(&self) -> String {
        format!("{} per oz", self.0)
    }
}

impl fmt::Display for BaseCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_uppercases() {
        assert_eq!(BaseCurrency::parse(" eur ").unwrap().as_str(), "EUR");
    }

    #[test]
    fn test_parse_blank_is_none() {
        assert!(BaseCurrency::parse("").is_none());
        assert!(BaseCurrency::parse("   ").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let usd = BaseCurrency::parse("USD").unwrap();
        assert_eq!(BaseCurrency::resolve(None, &usd), usd);
        assert_eq!(BaseCurrency::resolve(Some("  "), &usd), usd);
        assert_eq!(BaseCurrency::resolve(Some("gbp"), &usd).as_str(), "GBP");
    }

    #[test]
    fn test_cache_key_and_unit() {
        let chf = BaseCurrency::parse("chf").unwrap();
        assert_eq!(chf.cache_key(), "latest:CHF");
        assert_eq!(chf.unit(), "CHF per oz");
    }
}
