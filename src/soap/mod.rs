//! SOAP plumbing: XML decoding, envelopes, operations and transport

pub mod envelope;
pub mod operation;
pub mod transport;
pub mod unwrap;
pub mod xml;

pub use operation::{Operation, RequestMessage};
pub use transport::{RawResponse, SoapTransport, Transport};
