//! Extraction of result payloads from decoded response bodies.
//!
//! A body holds `<{Operation}Response>` which holds `<{Operation}Result>`; both
//! keys come from the [`Operation`] table. Absent keys are reported with the
//! full expected path, so a response of one kind never turns into a result of
//! another kind.

use tracing::debug;

use crate::core::error::{EodDataError, Result};
use crate::core::result::{
    LoginResult, OperationResult, QuoteGetResult, QuoteListByDateResult, QuoteListResult,
};
use crate::soap::operation::Operation;
use crate::soap::transport::RawResponse;
use crate::soap::xml::Element;

fn extract_payload(body: Element, operation: Operation) -> Result<Element> {
    let response_key = operation.response_key();
    let result_key = operation.result_key();

    let envelope = body
        .children
        .into_iter()
        .find(|child| child.name == response_key)
        .ok_or_else(|| EodDataError::malformed(format!("body/{response_key}")))?;

    envelope
        .children
        .into_iter()
        .find(|child| child.name == result_key)
        .ok_or_else(|| EodDataError::malformed(format!("body/{response_key}/{result_key}")))
}

/// Unwraps the payload expected for `R` and builds the typed result.
pub fn unwrap_response<R: OperationResult>(raw: RawResponse) -> Result<R> {
    let payload = extract_payload(raw.body, R::OPERATION)?;
    debug!(operation = %R::OPERATION, "Unwrapped result payload");
    Ok(R::from_payload(payload))
}

/// A result whose kind is decided by the envelope found in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyResult {
    Login(LoginResult),
    QuoteGet(QuoteGetResult),
    QuoteList(QuoteListResult),
    QuoteListByDate(QuoteListByDateResult),
}

impl AnyResult {
    pub fn from_response(raw: RawResponse) -> Result<Self> {
        let envelope_name = raw
            .body
            .children
            .first()
            .map(|child| child.name.clone())
            .ok_or_else(|| EodDataError::malformed("body/*_response"))?;
        let operation = Operation::from_response_key(&envelope_name)
            .ok_or(EodDataError::UnknownResultType(envelope_name))?;

        Ok(match operation {
            Operation::Login => AnyResult::Login(unwrap_response(raw)?),
            Operation::QuoteGet => AnyResult::QuoteGet(unwrap_response(raw)?),
            Operation::QuoteList2 => AnyResult::QuoteList(unwrap_response(raw)?),
            Operation::QuoteListByDate => AnyResult::QuoteListByDate(unwrap_response(raw)?),
        })
    }

    pub fn operation(&self) -> Operation {
        match self {
            AnyResult::Login(_) => Operation::Login,
            AnyResult::QuoteGet(_) => Operation::QuoteGet,
            AnyResult::QuoteList(_) => Operation::QuoteList2,
            AnyResult::QuoteListByDate(_) => Operation::QuoteListByDate,
        }
    }
}
