//! Price unit converters

use crate::core::error::{EodDataError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Normalizes a raw wire price into a decimal under one unit convention.
pub trait PriceConverter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Decimal>;
}

fn parse_decimal(raw: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| EodDataError::Parse {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Prices already quoted in the unit the caller wants.
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginalPrice;

impl PriceConverter for OriginalPrice {
    fn convert(&self, raw: &str) -> Result<Decimal> {
        parse_decimal(raw, raw.trim())
    }
}

/// Prices quoted in cents per pound, returned in dollars per pound.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentsPerPoundPrice;

impl PriceConverter for CentsPerPoundPrice {
    fn convert(&self, raw: &str) -> Result<Decimal> {
        Ok(parse_decimal(raw, raw.trim())? / Decimal::ONE_HUNDRED)
    }
}

/// Grain prices quoted as `<cents>.<fraction>` per bushel, returned in dollars.
///
/// The fraction is a suffix rather than a true decimal part, so the value is
/// rebuilt from its two components before scaling. A missing fraction counts
/// as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct BushelPrice;

impl PriceConverter for BushelPrice {
    fn convert(&self, raw: &str) -> Result<Decimal> {
        let mut components = raw.trim().split('.');
        let whole = components.next().unwrap_or_default();
        let fraction = components.next().filter(|f| !f.is_empty()).unwrap_or("0");

        let parse_error = |reason: &str| EodDataError::Parse {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };
        let digits = whole.strip_prefix(['-', '+']).unwrap_or(whole);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(parse_error("whole component is not a number"));
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(parse_error("fraction component is not a number"));
        }

        Ok(parse_decimal(raw, &format!("{whole}.{fraction}"))? / Decimal::ONE_HUNDRED)
    }
}

/// Identifies a converter in configuration and in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConverterKind {
    OriginalPrice,
    CentsPerPoundPrice,
    BushelPrice,
}

impl ConverterKind {
    pub fn converter(&self) -> &'static dyn PriceConverter {
        match self {
            ConverterKind::OriginalPrice => &OriginalPrice,
            ConverterKind::CentsPerPoundPrice => &CentsPerPoundPrice,
            ConverterKind::BushelPrice => &BushelPrice,
        }
    }
}

impl PriceConverter for ConverterKind {
    fn convert(&self, raw: &str) -> Result<Decimal> {
        self.converter().convert(raw)
    }
}

impl Display for ConverterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ConverterKind::OriginalPrice => "OriginalPrice",
                ConverterKind::CentsPerPoundPrice => "CentsPerPoundPrice",
                ConverterKind::BushelPrice => "BushelPrice",
            }
        )
    }
}

impl FromStr for ConverterKind {
    type Err = EodDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OriginalPrice" => Ok(ConverterKind::OriginalPrice),
            "CentsPerPoundPrice" => Ok(ConverterKind::CentsPerPoundPrice),
            "BushelPrice" => Ok(ConverterKind::BushelPrice),
            other => Err(EodDataError::UnknownConverter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_original_price_is_identity() {
        assert_eq!(OriginalPrice.convert("387.75").unwrap(), dec!(387.75));
        assert_eq!(OriginalPrice.convert(" 12 ").unwrap(), dec!(12));
    }

    #[test]
    fn test_cents_per_pound_price() {
        assert_eq!(CentsPerPoundPrice.convert("12345").unwrap(), dec!(123.45));
        assert_eq!(CentsPerPoundPrice.convert("67.5").unwrap(), dec!(0.675));
    }

    #[test]
    fn test_bushel_price() {
        assert_eq!(BushelPrice.convert("350.1").unwrap(), dec!(3.501));
        assert_eq!(BushelPrice.convert("350").unwrap(), dec!(3.50));
        assert_eq!(BushelPrice.convert("  387.75\n").unwrap(), dec!(3.8775));
        assert_eq!(BushelPrice.convert("-1.25").unwrap(), dec!(-0.0125));
        assert_eq!(BushelPrice.convert("350.").unwrap(), dec!(3.50));
        assert_eq!(
            BushelPrice.convert("99999999999999999999.5").unwrap(),
            dec!(999999999999999999.995)
        );
    }

    #[test]
    fn test_bushel_price_rejects_non_numeric_whole() {
        let err = BushelPrice.convert("abc.5").unwrap_err();
        assert!(matches!(err, EodDataError::Parse { ref raw, .. } if raw == "abc.5"));
        assert!(BushelPrice.convert("").is_err());
        assert!(BushelPrice.convert("350.x").is_err());
    }

    #[test]
    fn test_conversions_are_deterministic() {
        for kind in [
            ConverterKind::OriginalPrice,
            ConverterKind::CentsPerPoundPrice,
            ConverterKind::BushelPrice,
        ] {
            assert_eq!(kind.convert("411.25").unwrap(), kind.convert("411.25").unwrap());
        }
    }

    #[test]
    fn test_converter_kind_names() {
        for kind in [
            ConverterKind::OriginalPrice,
            ConverterKind::CentsPerPoundPrice,
            ConverterKind::BushelPrice,
        ] {
            assert_eq!(kind.to_string().parse::<ConverterKind>().unwrap(), kind);
        }
        assert!(matches!(
            "TonPrice".parse::<ConverterKind>(),
            Err(EodDataError::UnknownConverter(name)) if name == "TonPrice"
        ));
    }
}
