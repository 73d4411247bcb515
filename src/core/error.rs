//! Error types for the client, the SOAP layer and price conversion

use thiserror::Error;

/// Crate-wide `Result` alias with `EodDataError` as the default error.
pub type Result<T, E = EodDataError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum EodDataError {
    /// No converter is registered for the 2-character symbol prefix.
    #[error("No price converter registered for symbol prefix: {0}")]
    UnregisteredSymbol(String),

    #[error("Unknown price converter: {0}")]
    UnknownConverter(String),

    #[error("Invalid symbol prefix '{0}': expected 2 characters")]
    InvalidSymbolPrefix(String),

    /// A raw price string could not be read as a decimal.
    #[error("Failed to parse price '{raw}': {reason}")]
    Parse { raw: String, reason: String },

    /// The decoded response lacks an element the operation depends on.
    #[error("Malformed response: expected {path}")]
    MalformedResponse { path: String },

    #[error("No result type registered for response: {0}")]
    UnknownResultType(String),

    #[error("Quote {symbol} has no {field} price")]
    MissingPrice { symbol: String, field: String },

    #[error("Login did not return a token: {message}")]
    NotAuthenticated { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {status} for operation: {operation}")]
    HttpStatus { status: u16, operation: String },

    #[error("SOAP fault {code}: {message}")]
    SoapFault { code: String, message: String },

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid service description: {0}")]
    Wsdl(String),
}

impl EodDataError {
    pub(crate) fn malformed(path: impl Into<String>) -> Self {
        EodDataError::MalformedResponse { path: path.into() }
    }
}

impl From<quick_xml::events::attributes::AttrError> for EodDataError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        EodDataError::Xml(err.into())
    }
}
