//! Domain types: configuration, errors, price conversion and results

pub mod config;
pub mod error;
pub mod log;
pub mod price;
pub mod quote;
pub mod registry;
pub mod result;

// Re-export main types for cleaner imports
pub use error::{EodDataError, Result};
pub use log::init_logging;
pub use price::{ConverterKind, PriceConverter};
pub use quote::{PriceField, Quote};
pub use registry::ConverterRegistry;
