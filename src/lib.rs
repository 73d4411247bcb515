//! Client for the EODData market quotes SOAP web service.
//!
//! ```no_run
//! use eoddata::{ClientConfig, EodDataClient, OperationResult, PriceField};
//!
//! # async fn run() -> eoddata::Result<()> {
//! let config = ClientConfig::default();
//! let client = EodDataClient::new(&config)?;
//!
//! let result = client.quotes("CBOT", &["ZCH20", "ZCN20"]).await?;
//! if result.is_success() {
//!     for quote in result.quotes()? {
//!         let close = quote.adjusted_value(PriceField::Close, client.converters())?;
//!         println!("{} {}", quote.symbol, close);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod soap;

pub use crate::client::EodDataClient;
pub use crate::core::config::{ClientConfig, Credentials};
pub use crate::core::error::{EodDataError, Result};
pub use crate::core::price::{ConverterKind, PriceConverter};
pub use crate::core::quote::{PriceField, Quote};
pub use crate::core::registry::ConverterRegistry;
pub use crate::core::result::{
    LoginResult, OperationResult, QuoteGetResult, QuoteListByDateResult, QuoteListResult,
};
pub use crate::soap::transport::{RawResponse, SoapTransport, Transport};
pub use crate::soap::unwrap::AnyResult;
