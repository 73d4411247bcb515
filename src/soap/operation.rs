//! The service operations and their request messages

use chrono::NaiveDate;
use std::fmt::Display;
use std::str::FromStr;

use crate::core::error::EodDataError;
use crate::soap::xml::snake_case;

/// Wire format for `QuoteDate` request values.
pub const QUOTE_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    QuoteGet,
    QuoteList2,
    QuoteListByDate,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Login,
        Operation::QuoteGet,
        Operation::QuoteList2,
        Operation::QuoteListByDate,
    ];

    /// The SOAP operation name, also the request body element.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Login => "Login",
            Operation::QuoteGet => "QuoteGet",
            Operation::QuoteList2 => "QuoteList2",
            Operation::QuoteListByDate => "QuoteListByDate",
        }
    }

    /// Decoded name of the `<OperationResponse>` envelope inside the body.
    pub fn response_key(&self) -> String {
        format!("{}_response", snake_case(self.name()))
    }

    /// Decoded name of the `<OperationResult>` payload inside the envelope.
    pub fn result_key(&self) -> String {
        format!("{}_result", snake_case(self.name()))
    }

    pub fn soap_action(&self, namespace: &str) -> String {
        format!("{}/{}", namespace.trim_end_matches('/'), self.name())
    }

    /// Finds the operation whose envelope key matches a decoded body element.
    pub fn from_response_key(key: &str) -> Option<Operation> {
        Operation::ALL
            .into_iter()
            .find(|operation| operation.response_key() == key)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operation {
    type Err = EodDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|operation| operation.name() == s || snake_case(operation.name()) == s)
            .ok_or_else(|| EodDataError::UnknownResultType(s.to_string()))
    }
}

/// Ordered key-value pairs sent as the children of the request element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    fields: Vec<(&'static str, String)>,
}

impl RequestMessage {
    pub fn login(username: &str, password: &str) -> Self {
        RequestMessage {
            fields: vec![
                ("Username", username.to_string()),
                ("Password", password.to_string()),
            ],
        }
    }

    pub fn quote_get(exchange: &str, symbol: &str, token: &str) -> Self {
        RequestMessage {
            fields: vec![
                ("Exchange", exchange.to_string()),
                ("Symbol", symbol.to_string()),
                ("Token", token.to_string()),
            ],
        }
    }

    /// Symbols travel as a single comma separated value.
    pub fn quote_list2<S: AsRef<str>>(exchange: &str, symbols: &[S], token: &str) -> Self {
        let symbols = symbols
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        RequestMessage {
            fields: vec![
                ("Exchange", exchange.to_string()),
                ("Symbols", symbols),
                ("Token", token.to_string()),
            ],
        }
    }

    pub fn quote_list_by_date(exchange: &str, quote_date: NaiveDate, token: &str) -> Self {
        RequestMessage {
            fields: vec![
                ("Exchange", exchange.to_string()),
                ("QuoteDate", quote_date.format(QUOTE_DATE_FORMAT).to_string()),
                ("Token", token.to_string()),
            ],
        }
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Field pairs safe to write to logs.
    pub fn redacted(&self) -> Vec<(&'static str, &str)> {
        self.fields
            .iter()
            .map(|(k, v)| match *k {
                "Password" | "Token" => (*k, "[redacted]"),
                _ => (*k, v.as_str()),
            })
            .collect()
    }
}
