//! Typed results for each service operation

use crate::core::error::{EodDataError, Result};
use crate::core::quote::Quote;
use crate::soap::operation::Operation;
use crate::soap::xml::Element;

/// A decoded `<OperationResult>` payload.
pub trait OperationResult: Sized {
    const OPERATION: Operation;

    fn from_payload(payload: Element) -> Self;

    fn payload(&self) -> &Element;

    fn message(&self) -> Option<&str> {
        self.payload().attribute("message")
    }

    /// Success means the payload carries data. The `message` is not inspected,
    /// so a rejected login with a well-formed payload still counts as success.
    fn is_success(&self) -> bool {
        !self.payload().is_empty()
    }
}

fn quotes_in(payload: &Element, result_key: &str) -> Result<Vec<Quote>> {
    let Some(container) = payload.child("quotes") else {
        return Ok(Vec::new());
    };
    container
        .children_named("quote")
        .enumerate()
        .map(|(i, element)| Quote::from_element(element, &format!("{result_key}/quotes/quote[{i}]")))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    payload: Element,
}

impl LoginResult {
    pub fn token(&self) -> Option<&str> {
        self.payload.attribute("token")
    }
}

impl OperationResult for LoginResult {
    const OPERATION: Operation = Operation::Login;

    fn from_payload(payload: Element) -> Self {
        LoginResult { payload }
    }

    fn payload(&self) -> &Element {
        &self.payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteGetResult {
    payload: Element,
}

impl QuoteGetResult {
    pub fn quote(&self) -> Result<Quote> {
        let path = format!("{}/quote", Self::OPERATION.result_key());
        let element = self
            .payload
            .child("quote")
            .ok_or_else(|| EodDataError::malformed(path.clone()))?;
        Quote::from_element(element, &path)
    }
}

impl OperationResult for QuoteGetResult {
    const OPERATION: Operation = Operation::QuoteGet;

    fn from_payload(payload: Element) -> Self {
        QuoteGetResult { payload }
    }

    fn payload(&self) -> &Element {
        &self.payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteListResult {
    payload: Element,
}

impl QuoteListResult {
    /// Quotes in wire order; empty when the response has no `QUOTES` container.
    pub fn quotes(&self) -> Result<Vec<Quote>> {
        quotes_in(&self.payload, &Self::OPERATION.result_key())
    }
}

impl OperationResult for QuoteListResult {
    const OPERATION: Operation = Operation::QuoteList2;

    fn from_payload(payload: Element) -> Self {
        QuoteListResult { payload }
    }

    fn payload(&self) -> &Element {
        &self.payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteListByDateResult {
    payload: Element,
}

impl QuoteListByDateResult {
    /// Quotes in wire order; empty when the response has no `QUOTES` container.
    pub fn quotes(&self) -> Result<Vec<Quote>> {
        quotes_in(&self.payload, &Self::OPERATION.result_key())
    }
}

impl OperationResult for QuoteListByDateResult {
    const OPERATION: Operation = Operation::QuoteListByDate;

    fn from_payload(payload: Element) -> Self {
        QuoteListByDateResult { payload }
    }

    fn payload(&self) -> &Element {
        &self.payload
    }
}
