//! ISO 4217 currency codes accepted on listings and wishlist items.
//!
//! Prices are carried for display only; no conversion or arithmetic across
//! currencies happens in this service.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unsupported currency code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    NGN,
    GHS,
    KES,
    ZAR,
}

impl CurrencyCode {
    /// Returns the three-letter code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::NGN => "NGN",
            Self::GHS => "GHS",
            Self::KES => "KES",
            Self::ZAR => "ZAR",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "NGN" => Ok(Self::NGN),
            "GHS" => Ok(Self::GHS),
            "KES" => Ok(Self::KES),
            "ZAR" => Ok(Self::ZAR),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("ngn".parse::<CurrencyCode>().unwrap(), CurrencyCode::NGN);
        assert_eq!(" Usd ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(
            "XYZ".parse::<CurrencyCode>(),
            Err(UnknownCurrency("XYZ".to_owned()))
        );
    }

    #[test]
    fn test_display_matches_serde() {
        let json = serde_json::to_string(&CurrencyCode::KES).unwrap();
        assert_eq!(json, format!("\"{}\"", CurrencyCode::KES));
    }
}
