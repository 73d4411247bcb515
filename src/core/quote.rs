//! Quote records as delivered by the service

use rust_decimal::Decimal;
use std::fmt::Display;

use crate::core::error::{EodDataError, Result};
use crate::core::price::PriceConverter;
use crate::core::registry::ConverterRegistry;
use crate::soap::xml::Element;

/// Price-bearing quote fields that can be adjusted through a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Previous,
    PreviousClose,
    NextOpen,
    Change,
    Bid,
    Ask,
}

impl Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PriceField::Open => "open",
                PriceField::High => "high",
                PriceField::Low => "low",
                PriceField::Close => "close",
                PriceField::Previous => "previous",
                PriceField::PreviousClose => "previous_close",
                PriceField::NextOpen => "next_open",
                PriceField::Change => "change",
                PriceField::Bid => "bid",
                PriceField::Ask => "ask",
            }
        )
    }
}

/// One quote with every value kept as the raw wire string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quote {
    pub symbol: String,
    pub description: Option<String>,
    pub name: Option<String>,
    pub date_time: Option<String>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
    pub open_interest: Option<String>,
    pub previous: Option<String>,
    pub change: Option<String>,
    pub bid: Option<String>,
    pub ask: Option<String>,
    pub previous_close: Option<String>,
    pub next_open: Option<String>,
    pub modified: Option<String>,
}

impl Quote {
    /// Builds a quote from a decoded `QUOTE` element. `path` locates the
    /// element in the response and is only used for error reporting.
    pub fn from_element(element: &Element, path: &str) -> Result<Self> {
        let attr = |name: &str| element.attribute(name).map(str::to_string);

        Ok(Quote {
            symbol: attr("symbol").ok_or_else(|| EodDataError::malformed(format!("{path}@symbol")))?,
            description: attr("description"),
            name: attr("name"),
            date_time: attr("date_time"),
            open: attr("open"),
            high: attr("high"),
            low: attr("low"),
            close: attr("close"),
            volume: attr("volume"),
            open_interest: attr("open_interest"),
            previous: attr("previous"),
            change: attr("change"),
            bid: attr("bid"),
            ask: attr("ask"),
            previous_close: attr("previous_close"),
            next_open: attr("next_open"),
            modified: attr("modified"),
        })
    }

    pub fn raw_value(&self, field: PriceField) -> Option<&str> {
        match field {
            PriceField::Open => self.open.as_deref(),
            PriceField::High => self.high.as_deref(),
            PriceField::Low => self.low.as_deref(),
            PriceField::Close => self.close.as_deref(),
            PriceField::Previous => self.previous.as_deref(),
            PriceField::PreviousClose => self.previous_close.as_deref(),
            PriceField::NextOpen => self.next_open.as_deref(),
            PriceField::Change => self.change.as_deref(),
            PriceField::Bid => self.bid.as_deref(),
            PriceField::Ask => self.ask.as_deref(),
        }
    }

    /// Converts a price field with the converter registered for this quote's
    /// symbol prefix. The registry is consulted on every call.
    pub fn adjusted_value(&self, field: PriceField, registry: &ConverterRegistry) -> Result<Decimal> {
        let raw = self
            .raw_value(field)
            .ok_or_else(|| EodDataError::MissingPrice {
                symbol: self.symbol.clone(),
                field: field.to_string(),
            })?;
        let converter = registry.resolve_symbol(&self.symbol)?;
        converter.convert(raw)
    }
}
