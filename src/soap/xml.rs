//! Decoding of SOAP/XML documents into a name-normalized element tree.
//!
//! Element and attribute names lose their namespace prefix and are converted
//! to snake_case, so `<QuoteGetResult Message="..">` reads back as element
//! `quote_get_result` with attribute `message`. Attributes and child elements
//! live in separate collections, and children are always an ordered sequence:
//! a container with a single child is a one-element sequence, never a scalar.

use crate::core::error::{EodDataError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

const XSI_NAMESPACE_PREFIX: &[u8] = b"xsi";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
    /// Set for elements carrying `xsi:nil="true"`.
    pub nil: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// True when the element carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.nil || (self.attributes.is_empty() && self.children.is_empty() && self.text.is_empty())
    }
}

/// Converts `QuoteList2Response`, `QUOTES` or `OpenInterest` style names to
/// `quote_list2_response`, `quotes` and `open_interest`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '.' {
            out.push('_');
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

fn decode_name(raw: &[u8]) -> String {
    snake_case(&String::from_utf8_lossy(raw))
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(decode_name(start.local_name().as_ref()));

    for attr in start.attributes() {
        let attr = attr?;
        let prefix = attr.key.prefix().map(|p| p.into_inner());
        let local_name = attr.key.local_name().into_inner();

        if attr.key.as_ref() == b"xmlns" || prefix == Some(b"xmlns".as_slice()) {
            continue;
        }
        let value = attr.unescape_value()?.into_owned();
        if prefix == Some(XSI_NAMESPACE_PREFIX) {
            if local_name == b"nil" {
                element.nil = value == "true";
            }
            continue;
        }
        element.attributes.push((decode_name(local_name), value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(EodDataError::malformed("a single document root")),
    }
    Ok(())
}

/// Parses a complete XML document and returns its root element.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| EodDataError::malformed("a matching start tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(EodDataError::malformed("a closed document root"));
    }
    root.ok_or_else(|| EodDataError::malformed("a document root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("QuoteGetResponse"), "quote_get_response");
        assert_eq!(snake_case("QuoteList2Result"), "quote_list2_result");
        assert_eq!(snake_case("QUOTES"), "quotes");
        assert_eq!(snake_case("QUOTE"), "quote");
        assert_eq!(snake_case("OpenInterest"), "open_interest");
        assert_eq!(snake_case("DateTime"), "date_time");
        assert_eq!(snake_case("Symbol"), "symbol");
        assert_eq!(snake_case("XMLHttpRequest"), "xml_http_request");
    }

    #[test]
    fn test_parse_attributes_and_namespaces() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body>
                <LoginResponse xmlns="http://ws.eoddata.com/Data">
                  <LoginResult Message="Login &amp; go" Token="ABC123XYZ000" />
                </LoginResponse>
              </soap:Body>
            </soap:Envelope>"#;

        let root = parse_document(xml).unwrap();
        assert_eq!(root.name, "envelope");
        assert!(root.attributes.is_empty());

        let result = root
            .child("body")
            .and_then(|b| b.child("login_response"))
            .and_then(|r| r.child("login_result"))
            .unwrap();
        assert_eq!(result.attribute("message"), Some("Login & go"));
        assert_eq!(result.attribute("token"), Some("ABC123XYZ000"));
    }

    #[test]
    fn test_container_arity_is_explicit() {
        let single = parse_document(r#"<QUOTES><QUOTE Symbol="A"/></QUOTES>"#).unwrap();
        assert_eq!(single.children_named("quote").count(), 1);

        let empty = parse_document("<QUOTES>\n   </QUOTES>").unwrap();
        assert_eq!(empty.children_named("quote").count(), 0);
        assert!(empty.is_empty());

        let many =
            parse_document(r#"<QUOTES><QUOTE Symbol="A"/><QUOTE Symbol="B"/></QUOTES>"#).unwrap();
        let symbols: Vec<_> = many
            .children_named("quote")
            .filter_map(|q| q.attribute("symbol"))
            .collect();
        assert_eq!(symbols, vec!["A", "B"]);
    }

    #[test]
    fn test_nil_and_text() {
        let xml = r#"<Root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
                       <Token xsi:nil="true"/>
                       <faultstring>Server was unable</faultstring>
                     </Root>"#;
        let root = parse_document(xml).unwrap();
        assert!(root.child("token").unwrap().nil);
        assert!(root.child("token").unwrap().is_empty());
        assert_eq!(root.child("faultstring").unwrap().text, "Server was unable");
    }

    #[test]
    fn test_unclosed_document_is_rejected() {
        assert!(parse_document("<Envelope><Body>").is_err());
        assert!(parse_document("").is_err());
    }
}
