//! SOAP 1.1 request envelopes and response bodies

use crate::core::error::{EodDataError, Result};
use crate::soap::operation::{Operation, RequestMessage};
use crate::soap::xml::{Element, parse_document};
use quick_xml::escape::escape;

pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Renders the request envelope for an operation in the service namespace.
pub fn build_request(namespace: &str, operation: Operation, message: &RequestMessage) -> String {
    let mut fields = String::new();
    for (key, value) in message.fields() {
        fields.push_str(&format!("<{key}>{}</{key}>", escape(value.as_str())));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
            r#"xmlns:soap="{soap}">"#,
            r#"<soap:Body><{op} xmlns="{ns}">{fields}</{op}></soap:Body>"#,
            r#"</soap:Envelope>"#
        ),
        soap = SOAP_ENVELOPE_NAMESPACE,
        op = operation.name(),
        ns = escape(namespace),
        fields = fields,
    )
}

/// Decodes a response document and returns its `body` element.
///
/// A body carrying a `Fault` is reported as [`EodDataError::SoapFault`].
pub fn decode_response(xml: &str) -> Result<Element> {
    let envelope = parse_document(xml)?;
    if envelope.name != "envelope" {
        return Err(EodDataError::malformed("envelope"));
    }
    let body = envelope
        .children
        .into_iter()
        .find(|child| child.name == "body")
        .ok_or_else(|| EodDataError::malformed("envelope/body"))?;

    if let Some(fault) = body.child("fault") {
        let text_of = |name: &str| {
            fault
                .child(name)
                .map(|e| e.text.clone())
                .unwrap_or_default()
        };
        return Err(EodDataError::SoapFault {
            code: text_of("faultcode"),
            message: text_of("faultstring"),
        });
    }
    Ok(body)
}
